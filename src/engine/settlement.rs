//! # engine::settlement
//!
//! **SettlementCalculator**: fee, tax, profit and ROI for closing a position
//! at one exit price.
//!
//! ## Order of operations
//! ```text
//! entry_notional = entry × shares        exit_notional = exit × shares
//! fee    = ⌊ max((entry_n + exit_n) × fee_rate × discount/10, min_fee) ⌋
//! tax    = ⌊ tax_base × tax_rate ⌋       LONG: exit_n   SHORT: entry_n
//! profit = ⌊ ±(exit_n − entry_n) − fee − tax ⌋
//! roi    = policy(profit / entry_n × 100)
//! ```
//! All roundings are floor, applied in that order.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimError;
use crate::models::{Direction, Price, SettlementResult, TradeParameters, TradeType};

// ─── RoiPolicy ────────────────────────────────────────────────────────────────

/// How the raw ROI percentage is rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiPolicy {
    /// Floor to a whole percent: 4.762 → 4, −0.3 → −1.
    #[default]
    #[serde(rename = "floor")]
    FloorPercent,
    /// Banker's rounding to two decimals: 4.762 → 4.76.
    TwoDecimals,
}

impl RoiPolicy {
    pub fn apply(self, raw_percent: Decimal) -> Decimal {
        match self {
            RoiPolicy::FloorPercent => raw_percent.floor(),
            RoiPolicy::TwoDecimals => raw_percent.round_dp(2),
        }
    }
}

impl std::str::FromStr for RoiPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floor" => Ok(RoiPolicy::FloorPercent),
            "two_decimals" => Ok(RoiPolicy::TwoDecimals),
            other => Err(format!("unknown ROI policy '{other}'. Use 'floor' or 'two_decimals'")),
        }
    }
}

// ─── SettlementCalculator ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementCalculator {
    pub fee_rate:          Decimal,
    pub min_fee:           Decimal,
    pub intraday_tax_rate: Decimal,
    pub regular_tax_rate:  Decimal,
    pub roi_policy:        RoiPolicy,
}

impl Default for SettlementCalculator {
    fn default() -> Self {
        Self {
            fee_rate:          dec!(0.001425),
            min_fee:           dec!(20),
            intraday_tax_rate: dec!(0.0015),
            regular_tax_rate:  dec!(0.003),
            roi_policy:        RoiPolicy::FloorPercent,
        }
    }
}

impl SettlementCalculator {
    pub fn tax_rate(&self, trade_type: TradeType) -> Decimal {
        match trade_type {
            TradeType::Intraday => self.intraday_tax_rate,
            TradeType::Regular  => self.regular_tax_rate,
        }
    }

    /// Settle `params` against `exit_price`.
    pub fn settle(
        &self,
        params:     &TradeParameters,
        exit_price: Price,
    ) -> Result<SettlementResult, SimError> {
        let shares         = Decimal::from(params.share_count());
        let entry_notional = checked(params.entry_price().checked_mul(shares))?;
        let exit_notional  = checked(exit_price.checked_mul(shares))?;

        let raw_fee = checked(
            entry_notional
                .checked_add(exit_notional)
                .and_then(|n| n.checked_mul(self.fee_rate))
                .and_then(|n| n.checked_mul(params.fee_discount() / Decimal::TEN)),
        )?;
        let fee = raw_fee.max(self.min_fee).floor();

        let tax_base = match params.direction() {
            Direction::Long  => exit_notional,
            Direction::Short => entry_notional,
        };
        let tax = checked(tax_base.checked_mul(self.tax_rate(params.trade_type())))?.floor();

        let gross = match params.direction() {
            Direction::Long  => exit_notional.checked_sub(entry_notional),
            Direction::Short => entry_notional.checked_sub(exit_notional),
        };
        let profit = checked(
            gross
                .and_then(|g| g.checked_sub(fee))
                .and_then(|g| g.checked_sub(tax)),
        )?
        .floor();

        let ratio = profit
            .checked_div(entry_notional)
            .ok_or(SimError::UndefinedRoi)?;
        let roi = self.roi_policy.apply(checked(ratio.checked_mul(Decimal::ONE_HUNDRED))?);

        debug!(
            entry = %params.entry_price(),
            exit  = %exit_price,
            %fee, %tax, %profit, %roi,
            "settled"
        );

        Ok(SettlementResult {
            fee:    to_amount(fee)?,
            tax:    to_amount(tax)?,
            profit: to_amount(profit)?,
            roi,
        })
    }
}

fn checked(value: Option<Decimal>) -> Result<Decimal, SimError> {
    value.ok_or(SimError::AmountOverflow)
}

fn to_amount(value: Decimal) -> Result<i64, SimError> {
    value.to_i64().ok_or(SimError::AmountOverflow)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
