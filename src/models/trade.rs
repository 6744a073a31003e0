//! # models::trade
//!
//! The caller-facing data model: what the form sends in
//! ([`TradeParametersInput`] → validated [`TradeParameters`]) and what comes
//! back out per ladder price ([`SettlementResult`], [`SettlementRow`]).
//!
//! Validation happens exactly once, in [`TradeParameters::new`].  The engine
//! downstream assumes a well-formed value and never re-checks it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::models::price::{serialize_quote, Price, QUOTE_DP};

// ─── TradeType ────────────────────────────────────────────────────────────────

/// Settlement regime.  Only affects the transaction-tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    /// Day-trade: opened and closed the same session, reduced tax.
    Intraday,
    Regular,
}

// ─── Direction ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Buy at entry, sell at exit.  Tax is levied on the exit notional.
    Long,
    /// Sell at entry, buy back at exit.  Tax is levied on the entry notional.
    Short,
}

// ─── Input ────────────────────────────────────────────────────────────────────

/// Raw request payload.  Integer/decimal fields are signed on purpose so a
/// negative share count produces a readable 400 instead of a serde failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeParametersInput {
    pub entry_price:  Decimal,
    pub share_count:  i64,
    pub fee_discount: Decimal,
    pub trade_type:   TradeType,
    pub direction:    Direction,
    /// Fixed ladder spacing.  `None` = exchange tick schedule.
    #[serde(default)]
    pub price_step:   Option<Decimal>,
}

impl TryFrom<TradeParametersInput> for TradeParameters {
    type Error = SimError;

    fn try_from(input: TradeParametersInput) -> Result<Self, Self::Error> {
        TradeParameters::new(
            input.entry_price,
            input.share_count,
            input.fee_discount,
            input.trade_type,
            input.direction,
            input.price_step,
        )
    }
}

// ─── TradeParameters ──────────────────────────────────────────────────────────

/// Immutable, validated trade description.  A new value replaces the old one
/// wholesale; it is never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeParameters {
    #[serde(serialize_with = "serialize_quote")]
    entry_price:  Price,
    share_count:  u64,
    fee_discount: Decimal,
    trade_type:   TradeType,
    direction:    Direction,
    price_step:   Option<Price>,
}

impl TradeParameters {
    pub const MIN_FEE_DISCOUNT: Decimal = dec!(0.1);
    pub const MAX_FEE_DISCOUNT: Decimal = dec!(10.0);
    /// Upper bound on `entry_price × share_count`.  Settlement amounts are
    /// whole currency units in an `i64`.
    pub const MAX_NOTIONAL: Decimal = dec!(1_000_000_000_000_000);

    /// Validate and build.  `entry_price` and `price_step` are taken at quote
    /// precision (two fractional digits), the same precision the form accepts.
    pub fn new(
        entry_price:  Decimal,
        share_count:  i64,
        fee_discount: Decimal,
        trade_type:   TradeType,
        direction:    Direction,
        price_step:   Option<Decimal>,
    ) -> Result<Self, SimError> {
        let entry_price = entry_price.round_dp(QUOTE_DP);
        if entry_price <= Decimal::ZERO {
            return Err(SimError::InvalidParameters(format!(
                "entry_price must be > 0 (got {entry_price})"
            )));
        }

        let share_count = u64::try_from(share_count)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                SimError::InvalidParameters(format!("share_count must be ≥ 1 (got {share_count})"))
            })?;

        if fee_discount < Self::MIN_FEE_DISCOUNT || fee_discount > Self::MAX_FEE_DISCOUNT {
            return Err(SimError::InvalidParameters(format!(
                "fee_discount must be within [{}, {}] (got {fee_discount})",
                Self::MIN_FEE_DISCOUNT,
                Self::MAX_FEE_DISCOUNT,
            )));
        }

        let within_cap = entry_price
            .checked_mul(Decimal::from(share_count))
            .is_some_and(|notional| notional <= Self::MAX_NOTIONAL);
        if !within_cap {
            return Err(SimError::InvalidParameters(format!(
                "entry notional {entry_price} × {share_count} exceeds {}",
                Self::MAX_NOTIONAL,
            )));
        }

        let price_step = match price_step.map(|step| step.round_dp(QUOTE_DP)) {
            Some(step) if step <= Decimal::ZERO => {
                return Err(SimError::InvalidParameters(format!(
                    "price_step must be at least 0.01 when given (got {step})"
                )));
            }
            other => other,
        };

        Ok(Self { entry_price, share_count, fee_discount, trade_type, direction, price_step })
    }

    pub fn entry_price(&self) -> Price { self.entry_price }
    pub fn share_count(&self) -> u64 { self.share_count }
    pub fn fee_discount(&self) -> Decimal { self.fee_discount }
    pub fn trade_type(&self) -> TradeType { self.trade_type }
    pub fn direction(&self) -> Direction { self.direction }
    pub fn price_step(&self) -> Option<Price> { self.price_step }

    /// `true` when switching from `self` to `next` invalidates the ladder:
    /// the anchor moved, or the grid the ladder was built on changed.
    pub fn requires_reset(&self, next: &TradeParameters) -> bool {
        self.entry_price != next.entry_price || self.price_step != next.price_step
    }
}

// ─── SettlementResult ─────────────────────────────────────────────────────────

/// Outcome of closing the position at one exit price.  Pure function of its
/// inputs; recomputed on every projection, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub fee:    i64,
    pub tax:    i64,
    pub profit: i64,
    /// Percent of entry notional, already rounded per the active `RoiPolicy`.
    pub roi:    Decimal,
}

impl SettlementResult {
    /// `"4%"`, `"-1%"`, `"4.76%"`.
    pub fn roi_label(&self) -> String {
        format!("{}%", self.roi.normalize())
    }
}

// ─── SettlementRow ────────────────────────────────────────────────────────────

/// One line of the result table the shell renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementRow {
    #[serde(serialize_with = "serialize_quote")]
    pub entry_price: Price,
    #[serde(serialize_with = "serialize_quote")]
    pub exit_price:  Price,
    pub tax:         i64,
    pub fee:         i64,
    pub profit:      i64,
    pub roi:         String,
}

impl SettlementRow {
    pub fn new(entry_price: Price, exit_price: Price, result: &SettlementResult) -> Self {
        Self {
            entry_price,
            exit_price,
            tax:    result.tax,
            fee:    result.fee,
            profit: result.profit,
            roi:    result.roi_label(),
        }
    }
}
