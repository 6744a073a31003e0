//! # state
//!
//! Shared application state injected into every Axum handler.
//!
//! * `Arc<AppState>` is cloned cheaply into handlers via
//!   `axum::extract::State`.
//! * Sessions are isolated from each other; see [`crate::session`] for the
//!   locking scheme.
//! * The settlement constants and tick table are read-only after startup and
//!   shared by every session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::AppConfig;
use crate::engine::{SettlementCalculator, TickSchedule};
use crate::events::SessionEvent;
use crate::session::SessionRegistry;

pub struct AppState {
    pub config:       Arc<AppConfig>,
    /// Exchange tick table; sessions without a fixed step share this `Arc`.
    pub schedule:     Arc<TickSchedule>,
    pub sessions:     SessionRegistry,
    /// Pre-serialized `SessionEvent`s for `/ws/monitor`.
    pub broadcast_tx: broadcast::Sender<String>,
    pub started_at:   DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);

        Self {
            config:       Arc::new(config),
            schedule:     Arc::new(TickSchedule::canonical()),
            sessions:     SessionRegistry::new(),
            broadcast_tx,
            started_at:   Utc::now(),
        }
    }

    pub fn calculator(&self) -> &SettlementCalculator {
        &self.config.settlement
    }

    /// Send to every WebSocket subscriber.  No subscriber is not an error.
    pub fn broadcast(&self, event: &SessionEvent) {
        let _ = self.broadcast_tx.send(event.to_json());
    }
}

pub type SharedState = Arc<AppState>;

pub fn build_state(config: AppConfig) -> SharedState {
    Arc::new(AppState::new(config))
}

/// Background task ending idle sessions every `session_sweep`.
pub fn spawn_session_reaper(state: SharedState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.session_sweep);
        loop {
            ticker.tick().await;
            let evicted = state.sessions.evict_idle(state.config.session_idle_ttl).await;
            debug!(evicted = evicted.len(), "session sweep");
            for session_id in evicted {
                state.broadcast(&SessionEvent::SessionClosed { session_id, reason: "IDLE" });
            }
        }
    })
}
