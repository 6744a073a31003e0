//! # routes::sessions
//!
//! Session-keyed ladder operations, the request/response form of
//! `reset` / `extend_up` / `extend_down` / `project`.
//!
//! | Method | Path                             | Description                      |
//! |--------|----------------------------------|----------------------------------|
//! | POST   | `/api/sessions`                  | open a session (initial reset)   |
//! | GET    | `/api/sessions/:id`              | params + projected rows          |
//! | PUT    | `/api/sessions/:id/params`       | replace params, reset if needed  |
//! | POST   | `/api/sessions/:id/extend-up`    | grow the ladder upward           |
//! | POST   | `/api/sessions/:id/extend-down`  | grow the ladder downward         |
//! | DELETE | `/api/sessions/:id`              | end the session                  |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    events::SessionEvent,
    ladder::Side,
    models::{TradeParameters, TradeParametersInput},
    session::{Session, SessionHandle},
    state::SharedState,
};

async fn lookup(state: &SharedState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No session {id}")))
}

// ─── POST /api/sessions ───────────────────────────────────────────────────────

pub async fn open_session(
    State(state): State<SharedState>,
    Json(input): Json<TradeParametersInput>,
) -> Result<impl IntoResponse, AppError> {
    let params = TradeParameters::try_from(input)?;
    let session = Session::open(params, &state.schedule, state.config.ladder_run_len)?;
    let view = session.view(state.calculator())?;
    let entry_price = session.params().entry_price();
    let session_id = session.id;

    state.sessions.insert(session).await;

    state.broadcast(&SessionEvent::SessionOpened { session_id, entry_price });
    state.broadcast(&SessionEvent::LadderReset {
        session_id,
        entry_price,
        size: view.ladder_size,
    });
    info!(%session_id, %entry_price, "📈 session opened");

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "session": view }))))
}

// ─── GET /api/sessions/:id ────────────────────────────────────────────────────

pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let handle = lookup(&state, id).await?;
    let session = handle.lock().await;
    let view = session.view(state.calculator())?;

    Ok(Json(json!({ "ok": true, "session": view })))
}

// ─── PUT /api/sessions/:id/params ─────────────────────────────────────────────

pub async fn update_params(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TradeParametersInput>,
) -> Result<impl IntoResponse, AppError> {
    let params = TradeParameters::try_from(input)?;
    let handle = lookup(&state, id).await?;
    let mut session = handle.lock().await;

    let reset = session.apply_params(params, &state.schedule, state.calculator())?;
    let view = session.view(state.calculator())?;

    if reset {
        state.broadcast(&SessionEvent::LadderReset {
            session_id: id,
            entry_price: session.params().entry_price(),
            size: view.ladder_size,
        });
    }

    Ok(Json(json!({ "ok": true, "reset": reset, "session": view })))
}

// ─── POST /api/sessions/:id/extend-{up,down} ──────────────────────────────────

pub async fn extend_up(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    extend(state, id, Side::Up).await
}

pub async fn extend_down(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    extend(state, id, Side::Down).await
}

async fn extend(
    state: SharedState,
    id:    Uuid,
    side:  Side,
) -> Result<Json<serde_json::Value>, AppError> {
    let handle = lookup(&state, id).await?;
    let mut session = handle.lock().await;

    let added = session.extend(side).map_err(|e| {
        warn!(session_id = %id, ?side, error = %e, "ladder extension rejected");
        e
    })?;
    let view = session.view(state.calculator())?;

    state.broadcast(&SessionEvent::LadderExtended {
        session_id: id,
        side,
        added,
        size: view.ladder_size,
    });

    Ok(Json(json!({ "ok": true, "added": added, "session": view })))
}

// ─── DELETE /api/sessions/:id ─────────────────────────────────────────────────

pub async fn close_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("No session {id}")));
    }

    state.broadcast(&SessionEvent::SessionClosed { session_id: id, reason: "DELETED" });
    info!(session_id = %id, "session closed");

    Ok(Json(json!({ "ok": true, "message": "Session closed" })))
}
