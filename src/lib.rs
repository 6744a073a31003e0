//! # Tickladder: exit-price ladder & settlement simulator
//!
//! Given an entry price, share count, fee discount, trade type and direction,
//! simulates fee / tax / profit / ROI across a ladder of candidate exit
//! prices laid out on the exchange's tick grid.
//!
//! ```text
//!  TradeParameters ──▶ LadderStore.reset / extend_up / extend_down
//!                          │
//!                          ▼
//!                   PriceLadderGenerator ──▶ TickSchedule
//!                          │
//!                          ▼
//!                   ResultProjector ──▶ SettlementCalculator (per price)
//!                          │
//!                          ▼
//!                    Vec<SettlementRow>
//! ```
//!
//! The core (`models`, `engine`, `ladder`) is plain synchronous code.  The
//! rest wraps it in an axum service keyed by session id.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ladder;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;

pub use engine::{PriceLadderGenerator, ResultProjector, RoiPolicy, SettlementCalculator, TickSchedule};
pub use error::{AppError, SimError};
pub use ladder::LadderStore;
pub use models::{Direction, Price, SettlementResult, SettlementRow, TradeParameters, TradeType};
