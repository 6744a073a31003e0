//! # error
//!
//! Two layers of errors:
//!
//! * [`SimError`]: raised by the pure core (tick lookup, ladder generation,
//!   settlement).  Everything is synchronous; there is no retry path.
//! * [`AppError`]: what every HTTP handler returns.  Axum's `IntoResponse`
//!   impl turns it into the `{"ok": false, "error": ...}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::Price;

// ─── SimError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Rejected at the boundary before reaching the engine.
    #[error("invalid trade parameters: {0}")]
    InvalidParameters(String),

    /// Tick lookup on a price ≤ 0.  Always a caller or generator bug.
    #[error("tick lookup on non-positive price {0}")]
    NonPositivePrice(Price),

    /// Stepping down from `from` would leave the positive price range.
    #[error("no valid price below {from}: ladder reached the price floor")]
    LadderFloor { from: Price },

    #[error("invalid tick schedule: {0}")]
    InvalidSchedule(String),

    /// ROI division guard: entry notional was zero.
    #[error("ROI undefined for zero entry notional")]
    UndefinedRoi,

    #[error("amount does not fit in an integer currency value")]
    AmountOverflow,
}

// ─── AppError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown or already-closed session.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Valid request the ladder cannot satisfy (stepping below zero, amounts
    /// past the integer range).
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidParameters(_) => AppError::BadRequest(err.to_string()),
            SimError::NonPositivePrice(_)
            | SimError::LadderFloor { .. }
            | SimError::AmountOverflow => {
                AppError::Unprocessable(err.to_string())
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
