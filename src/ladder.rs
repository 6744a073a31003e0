//! # ladder
//!
//! **LadderStore**: the growable set of candidate exit prices for one
//! session.
//!
//! ## Invariants
//! * Values are unique and kept ascending in storage, not just on display.
//! * The ladder only grows: `extend_up` appends above the maximum,
//!   `extend_down` prepends below the minimum.  Nothing is removed until a
//!   full `reset`.
//! * Every mutation computes its whole run first and only then touches the
//!   deque, so a failed extension leaves the ladder exactly as it was.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{PriceLadderGenerator, TickSchedule};
use crate::error::SimError;
use crate::models::Price;

/// Prices generated per side on reset, and per extension.
pub const DEFAULT_RUN_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct LadderStore {
    schedule: Arc<TickSchedule>,
    run_len:  usize,
    entry:    Option<Price>,
    prices:   VecDeque<Price>,
}

impl LadderStore {
    pub fn new(schedule: Arc<TickSchedule>, run_len: usize) -> Self {
        Self { schedule, run_len, entry: None, prices: VecDeque::new() }
    }

    fn generator(&self) -> PriceLadderGenerator<'_> {
        PriceLadderGenerator::new(&self.schedule)
    }

    pub fn entry(&self) -> Option<Price> {
        self.entry
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Ascending view of the ladder.
    pub fn prices(&self) -> impl Iterator<Item = Price> + '_ {
        self.prices.iter().copied()
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }

    pub fn run_len(&self) -> usize {
        self.run_len
    }

    /// Rebuild around `entry`.  Returns `false` (and does nothing) if the
    /// ladder is already anchored at `entry`.
    pub fn reset(&mut self, entry: Price) -> Result<bool, SimError> {
        if self.entry == Some(entry) {
            debug!(%entry, "reset skipped, entry unchanged");
            return Ok(false);
        }

        let ladder = self.generator().build_initial_ladder(entry, self.run_len)?;
        self.prices = ladder.into();
        self.entry = Some(entry);

        info!(%entry, size = self.prices.len(), "🪜 ladder reset");
        Ok(true)
    }

    /// Append `run_len` prices above the current maximum.
    pub fn extend_up(&mut self) -> Result<usize, SimError> {
        let anchor = self.anchor(Side::Up)?;
        let run = self.generator().run_up(anchor, self.run_len)?;
        let added = run.len();
        self.prices.extend(run);

        info!(%anchor, added, size = self.prices.len(), "🪜 ladder extended up");
        Ok(added)
    }

    /// Prepend `run_len` prices below the current minimum.
    pub fn extend_down(&mut self) -> Result<usize, SimError> {
        let anchor = self.anchor(Side::Down)?;
        let run = self.generator().run_down(anchor, self.run_len)?;
        let added = run.len();

        // run is closest-first (descending); pushing each to the front in
        // that order leaves the lowest price at index 0.
        for price in run {
            self.prices.push_front(price);
        }

        info!(%anchor, added, size = self.prices.len(), "🪜 ladder extended down");
        Ok(added)
    }

    pub fn extend(&mut self, side: Side) -> Result<usize, SimError> {
        match side {
            Side::Up => self.extend_up(),
            Side::Down => self.extend_down(),
        }
    }

    /// max / min over `ladder ∪ {entry}`.
    fn anchor(&self, side: Side) -> Result<Price, SimError> {
        let entry = self.entry.ok_or_else(|| {
            SimError::InvalidParameters("ladder has no entry price; reset first".into())
        })?;

        let edge = match side {
            Side::Up => self.prices.back(),
            Side::Down => self.prices.front(),
        };

        Ok(match (side, edge) {
            (Side::Up, Some(&p)) => p.max(entry),
            (Side::Down, Some(&p)) => p.min(entry),
            (_, None) => entry,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_store() -> LadderStore {
        LadderStore::new(Arc::new(TickSchedule::canonical()), DEFAULT_RUN_LEN)
    }

    fn snapshot(store: &LadderStore) -> Vec<Price> {
        store.prices().collect()
    }

    fn is_strictly_ascending(prices: &[Price]) -> bool {
        prices.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_reset_builds_eleven_prices_around_entry() {
        let mut store = make_store();
        assert!(store.reset(dec!(100)).unwrap());

        let prices = snapshot(&store);
        assert_eq!(prices.len(), 11);
        assert_eq!(prices[5], dec!(100));
        assert!(is_strictly_ascending(&prices));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut store = make_store();
        store.reset(dec!(100)).unwrap();
        store.extend_up().unwrap();
        let before = snapshot(&store);

        assert!(!store.reset(dec!(100.00)).unwrap());
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn test_reset_on_new_entry_discards_extensions() {
        let mut store = make_store();
        store.reset(dec!(100)).unwrap();
        store.extend_up().unwrap();
        store.extend_down().unwrap();
        assert_eq!(store.len(), 21);

        assert!(store.reset(dec!(200)).unwrap());
        assert_eq!(store.len(), 11);
        assert_eq!(store.entry(), Some(dec!(200)));
    }

    #[test]
    fn test_extend_up_appends_five_above_max() {
        let mut store = make_store();
        store.reset(dec!(49.55)).unwrap();
        let before = snapshot(&store);
        let prev_max = *before.last().unwrap();
        assert_eq!(prev_max, dec!(49.80));

        assert_eq!(store.extend_up().unwrap(), 5);
        let after = snapshot(&store);

        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(
            &after[before.len()..],
            &[dec!(49.85), dec!(49.90), dec!(49.95), dec!(50.00), dec!(50.10)]
        );
        assert!(after[before.len()..].iter().all(|&p| p > prev_max));
    }

    #[test]
    fn test_extend_down_prepends_five_ascending() {
        let mut store = make_store();
        store.reset(dec!(10.35)).unwrap();
        let before = snapshot(&store);
        assert_eq!(before[0], dec!(10.10));

        assert_eq!(store.extend_down().unwrap(), 5);
        let after = snapshot(&store);

        assert_eq!(
            &after[..5],
            &[dec!(9.97), dec!(9.98), dec!(9.99), dec!(10.00), dec!(10.05)]
        );
        assert_eq!(&after[5..], &before[..]);
        assert!(is_strictly_ascending(&after));
    }

    #[test]
    fn test_repeated_extensions_keep_order() {
        let mut store = make_store();
        store.reset(dec!(100)).unwrap();
        for _ in 0..4 {
            store.extend(Side::Up).unwrap();
            store.extend(Side::Down).unwrap();
        }
        let prices = snapshot(&store);
        assert_eq!(prices.len(), 11 + 8 * 5);
        assert!(is_strictly_ascending(&prices));
    }

    #[test]
    fn test_extend_before_reset_fails() {
        let mut store = make_store();
        assert!(store.extend_up().is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_extension_leaves_ladder_untouched() {
        let mut store = make_store();
        store.reset(dec!(0.08)).unwrap();
        assert_eq!(store.prices().next(), Some(dec!(0.03)));
        let before = snapshot(&store);

        // 0.03 → 0.02 → 0.01 → floor
        assert!(matches!(store.extend_down(), Err(SimError::LadderFloor { .. })));
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn test_uniform_schedule_store() {
        let schedule = Arc::new(TickSchedule::uniform(dec!(1)).unwrap());
        let mut store = LadderStore::new(schedule, 3);
        store.reset(dec!(100)).unwrap();
        assert_eq!(
            snapshot(&store),
            vec![dec!(97), dec!(98), dec!(99), dec!(100), dec!(101), dec!(102), dec!(103)]
        );
    }
}
