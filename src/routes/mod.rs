pub mod monitor;
pub mod quote;
pub mod sessions;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::require_api_key;
use crate::state::SharedState;

use monitor::{health_check, ws_monitor};
use quote::{quote_exit, tick_info};
use sessions::{close_session, extend_down, extend_up, get_session, open_session, update_params};

/// Full HTTP surface with middleware applied.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Liveness ──────────────────────────────────────────────────────────
        .route("/health",                        get(health_check))
        // ── Session ladder ────────────────────────────────────────────────────
        .route("/api/sessions",                  post(open_session))
        .route("/api/sessions/:id",              get(get_session).delete(close_session))
        .route("/api/sessions/:id/params",       put(update_params))
        .route("/api/sessions/:id/extend-up",    post(extend_up))
        .route("/api/sessions/:id/extend-down",  post(extend_down))
        // ── Stateless ─────────────────────────────────────────────────────────
        .route("/api/quote",                     post(quote_exit))
        .route("/api/ticks",                     get(tick_info))
        // ── Monitor ───────────────────────────────────────────────────────────
        .route("/ws/monitor",                    get(ws_monitor))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
