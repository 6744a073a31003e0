//! # Tickladder: HTTP server
//!
//! ```text
//!  ┌─────────────┐  POST /api/sessions              ┌──────────────────────────┐
//!  │  Form shell │ ───────────────────────────────▶ │ AppState                 │
//!  │             │  PUT  /api/sessions/:id/params   │ ├─ sessions (per-session │
//!  │             │  POST /api/sessions/:id/extend-* │ │   Mutex<LadderStore>)   │
//!  │             │ ◀─────────── rows ────────────── │ ├─ schedule (tick table) │
//!  └─────────────┘                                  │ └─ broadcast_tx ───────┐ │
//!                                                   └────────────────────────┼─┘
//!  ┌─────────────┐  ws://host/ws/monitor  ◀──────────────────────────────────┘
//!  │  Dashboard  │
//!  └─────────────┘
//! ```
//!
//! Configuration comes from the environment (and `.env`); see
//! [`tickladder::config`].  `RUST_LOG` overrides the tracing filter.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tickladder::config::AppConfig;
use tickladder::routes::build_router;
use tickladder::state::{build_state, spawn_session_reaper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("tickladder=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    // ── 3. Config & shared state ──────────────────────────────────────────────
    let config = AppConfig::from_env()?;
    let addr = config.bind_addr;
    info!(
        run_len    = config.ladder_run_len,
        roi_policy = ?config.settlement.roi_policy,
        auth       = config.api_key.is_some(),
        "configuration loaded"
    );

    let state = build_state(config);
    spawn_session_reaper(state.clone());

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let app = build_router(state);

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    info!(?addr, "🚀 Tickladder server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
