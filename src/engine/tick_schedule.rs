//! # engine::tick_schedule
//!
//! Price → minimum tick.  The exchange publishes a step table; a price belongs
//! to the band whose lower bound it meets (lower bounds are inclusive).
//!
//! ```text
//!   [0, 10)      → 0.01
//!   [10, 50)     → 0.05
//!   [50, 100)    → 0.10
//!   [100, 500)   → 0.50
//!   [500, 1000)  → 1
//!   [1000, ∞)    → 5
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use crate::error::SimError;
use crate::models::Price;

// ─── TickBand ─────────────────────────────────────────────────────────────────

/// One row of the table.  `upper_bound_exclusive = None` marks the last,
/// unbounded band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickBand {
    pub upper_bound_exclusive: Option<Price>,
    pub tick: Price,
}

impl TickBand {
    pub const fn bounded(upper_bound_exclusive: Price, tick: Price) -> Self {
        Self { upper_bound_exclusive: Some(upper_bound_exclusive), tick }
    }

    pub const fn unbounded(tick: Price) -> Self {
        Self { upper_bound_exclusive: None, tick }
    }
}

// ─── TickSchedule ─────────────────────────────────────────────────────────────

/// Ordered, contiguous band table covering `(0, ∞)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSchedule {
    bands: Vec<TickBand>,
}

impl TickSchedule {
    /// The exchange's equity tick table.
    pub fn canonical() -> Self {
        Self {
            bands: vec![
                TickBand::bounded(dec!(10), dec!(0.01)),
                TickBand::bounded(dec!(50), dec!(0.05)),
                TickBand::bounded(dec!(100), dec!(0.10)),
                TickBand::bounded(dec!(500), dec!(0.50)),
                TickBand::bounded(dec!(1000), dec!(1)),
                TickBand::unbounded(dec!(5)),
            ],
        }
    }

    /// A single unbounded band: every step is `step`.
    pub fn uniform(step: Price) -> Result<Self, SimError> {
        Self::from_bands(vec![TickBand::unbounded(step)])
    }

    /// Build from an arbitrary table, enforcing the band invariant: bounds
    /// strictly increasing and positive, ticks positive, exactly the last band
    /// unbounded.
    pub fn from_bands(bands: Vec<TickBand>) -> Result<Self, SimError> {
        let Some((last, bounded)) = bands.split_last() else {
            return Err(SimError::InvalidSchedule("empty band table".into()));
        };

        if last.upper_bound_exclusive.is_some() {
            return Err(SimError::InvalidSchedule(
                "last band must be unbounded".into(),
            ));
        }

        let mut lower = Decimal::ZERO;
        for (i, band) in bounded.iter().enumerate() {
            let upper = band.upper_bound_exclusive.ok_or_else(|| {
                SimError::InvalidSchedule(format!("band {i} is unbounded but not last"))
            })?;
            if upper <= lower {
                return Err(SimError::InvalidSchedule(format!(
                    "band {i} upper bound {upper} does not exceed {lower}"
                )));
            }
            lower = upper;
        }

        if let Some(band) = bands.iter().find(|b| b.tick <= Decimal::ZERO) {
            return Err(SimError::InvalidSchedule(format!(
                "tick must be positive (got {})",
                band.tick
            )));
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[TickBand] {
        &self.bands
    }

    /// Minimum tick for the band containing `price`.
    ///
    /// Fails fast on `price ≤ 0` instead of clamping: a non-positive ladder
    /// value means something upstream is broken.
    pub fn tick(&self, price: Price) -> Result<Price, SimError> {
        if price <= Decimal::ZERO {
            return Err(SimError::NonPositivePrice(price));
        }

        let band = self
            .bands
            .iter()
            .find(|b| b.upper_bound_exclusive.map_or(true, |upper| price < upper))
            .ok_or_else(|| SimError::InvalidSchedule("table does not cover price".into()))?;

        debug!(%price, tick = %band.tick, "tick lookup");
        Ok(band.tick)
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::canonical()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
