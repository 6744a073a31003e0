//! # routes::quote
//!
//! Stateless helpers that need no session.
//!
//! | Method | Path                 | Description                              |
//! |--------|----------------------|------------------------------------------|
//! | POST   | `/api/quote`         | settle one exit price                    |
//! | GET    | `/api/ticks?price=P` | tick size and neighbours of `P`          |

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{
    engine::PriceLadderGenerator,
    error::AppError,
    models::{quote, SettlementRow, TradeParameters, TradeParametersInput},
    state::SharedState,
};

#[derive(Deserialize)]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub params:     TradeParametersInput,
    pub exit_price: Decimal,
}

// ─── POST /api/quote ──────────────────────────────────────────────────────────

pub async fn quote_exit(
    State(state): State<SharedState>,
    Json(req): Json<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let params = TradeParameters::try_from(req.params)?;
    if req.exit_price <= Decimal::ZERO {
        return Err(AppError::BadRequest(format!(
            "exit_price must be > 0 (got {})",
            req.exit_price
        )));
    }

    let result = state.calculator().settle(&params, req.exit_price)?;
    let row = SettlementRow::new(params.entry_price(), req.exit_price, &result);

    Ok(Json(json!({ "ok": true, "row": row })))
}

// ─── GET /api/ticks ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TickQuery {
    pub price: Decimal,
}

pub async fn tick_info(
    State(state): State<SharedState>,
    Query(q): Query<TickQuery>,
) -> Result<impl IntoResponse, AppError> {
    let generator = PriceLadderGenerator::new(&state.schedule);

    let tick = state.schedule.tick(q.price)?;
    let next_up = generator.next_up(q.price)?;
    // Below the lowest tick there is no next price; report it instead of failing.
    let next_down = generator.next_down(q.price).ok().map(quote);

    Ok(Json(json!({
        "ok":        true,
        "price":     quote(q.price),
        "tick":      tick,
        "next_up":   quote(next_up),
        "next_down": next_down,
    })))
}
