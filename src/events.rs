//! # events
//!
//! [`SessionEvent`]: everything broadcast to `/ws/monitor` subscribers.
//!
//! Sent over `tokio::sync::broadcast::Sender<String>` as pre-serialized JSON.

use serde::Serialize;
use uuid::Uuid;

use crate::ladder::Side;
use crate::models::price::serialize_quote;
use crate::models::Price;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    SessionOpened {
        session_id: Uuid,
        #[serde(serialize_with = "serialize_quote")]
        entry_price: Price,
    },

    /// Ladder rebuilt around a new anchor.
    LadderReset {
        session_id: Uuid,
        #[serde(serialize_with = "serialize_quote")]
        entry_price: Price,
        size: usize,
    },

    LadderExtended {
        session_id: Uuid,
        side: Side,
        added: usize,
        size: usize,
    },

    /// `reason` is `"DELETED"` or `"IDLE"`.
    SessionClosed {
        session_id: Uuid,
        reason: &'static str,
    },
}

impl SessionEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
