//! # routes::monitor
//!
//! | Method    | Path           | Description                               |
//! |-----------|----------------|-------------------------------------------|
//! | GET (WS)  | `/ws/monitor`  | real-time `SessionEvent` stream           |
//! | GET       | `/health`      | liveness, session count, uptime           |

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::SharedState;

// ─── WebSocket Handler ────────────────────────────────────────────────────────

pub async fn ws_monitor(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("🔌 WebSocket client connected");

    // ── Snapshot first, then the live stream ─────────────────────────────────
    let snapshot = json!({
        "event":         "SNAPSHOT",
        "session_count": state.sessions.len().await,
        "started_at":    state.started_at,
    });
    if sender.send(Message::Text(snapshot.to_string())).await.is_err() {
        return;
    }

    // ── Event Loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("WS client lagged, skipped {n} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => debug!("ignoring inbound WebSocket frame"),
                }
            }
        }
    }

    info!("🔌 WebSocket client disconnected");
}

// ─── GET /health ──────────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds();

    Json(json!({
        "ok":            true,
        "session_count": state.sessions.len().await,
        "uptime_secs":   uptime_secs,
    }))
}
