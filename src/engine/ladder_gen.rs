//! # engine::ladder_gen
//!
//! **PriceLadderGenerator**: walks the tick grid one step at a time.
//!
//! ## Boundary asymmetry
//!
//! ```text
//!   next_up(p)   = p + tick(p)          band p sits in
//!   next_down(p) = p − tick(p − ε)      band just below p
//! ```
//!
//! At an exact band edge the two directions use different ticks:
//! `next_up(10.00) = 10.05` (the `[10, 50)` tick) but
//! `next_down(10.00) = 9.99` (the `[0, 10)` tick).  Looking up `tick(p)` for
//! both directions would step down to `9.95` and skip four valid prices.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::engine::tick_schedule::TickSchedule;
use crate::error::SimError;
use crate::models::Price;

/// Nudge used to find the band just below a price.  Must stay finer than the
/// smallest tick in any schedule we build.
pub const DOWN_NUDGE: Decimal = dec!(0.0000001);

/// Stateless stepper over one [`TickSchedule`].
#[derive(Debug, Clone, Copy)]
pub struct PriceLadderGenerator<'a> {
    schedule: &'a TickSchedule,
}

impl<'a> PriceLadderGenerator<'a> {
    pub fn new(schedule: &'a TickSchedule) -> Self {
        Self { schedule }
    }

    pub fn next_up(&self, price: Price) -> Result<Price, SimError> {
        price
            .checked_add(self.schedule.tick(price)?)
            .ok_or(SimError::AmountOverflow)
    }

    /// Errors with [`SimError::LadderFloor`] instead of producing a price ≤ 0.
    pub fn next_down(&self, price: Price) -> Result<Price, SimError> {
        let below = price.checked_sub(DOWN_NUDGE).ok_or(SimError::AmountOverflow)?;
        let next = price
            .checked_sub(self.schedule.tick(below)?)
            .ok_or(SimError::AmountOverflow)?;
        if next <= Decimal::ZERO {
            return Err(SimError::LadderFloor { from: price });
        }
        Ok(next)
    }

    /// `n` prices above `anchor`, ascending (closest first).
    pub fn run_up(&self, anchor: Price, n: usize) -> Result<Vec<Price>, SimError> {
        let mut out = Vec::with_capacity(n);
        let mut cursor = anchor;
        for _ in 0..n {
            cursor = self.next_up(cursor)?;
            out.push(cursor);
        }
        Ok(out)
    }

    /// `n` prices below `anchor` in generation order: closest first, so the
    /// run is *descending*.
    pub fn run_down(&self, anchor: Price, n: usize) -> Result<Vec<Price>, SimError> {
        let mut out = Vec::with_capacity(n);
        let mut cursor = anchor;
        for _ in 0..n {
            cursor = self.next_down(cursor)?;
            out.push(cursor);
        }
        Ok(out)
    }

    /// `n` below + `entry` + `n` above, ascending.
    pub fn build_initial_ladder(&self, entry: Price, n: usize) -> Result<Vec<Price>, SimError> {
        let mut below = self.run_down(entry, n)?;
        below.reverse();

        let above = self.run_up(entry, n)?;

        let mut ladder = Vec::with_capacity(2 * n + 1);
        ladder.extend(below);
        ladder.push(entry);
        ladder.extend(above);
        Ok(ladder)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> TickSchedule {
        TickSchedule::canonical()
    }

    #[test]
    fn test_boundary_asymmetry_at_ten() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_up(dec!(10.00)).unwrap(), dec!(10.05));
        assert_eq!(g.next_down(dec!(10.00)).unwrap(), dec!(9.99));
        assert_ne!(g.next_down(dec!(10.00)).unwrap(), dec!(9.95));
    }

    #[test]
    fn test_boundary_asymmetry_at_hundred() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_up(dec!(100.00)).unwrap(), dec!(100.50));
        assert_eq!(g.next_down(dec!(100.00)).unwrap(), dec!(99.90));
    }

    #[test]
    fn test_every_band_edge_steps_down_with_finer_tick() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_down(dec!(50)).unwrap(), dec!(49.95));
        assert_eq!(g.next_down(dec!(500)).unwrap(), dec!(499.5));
        assert_eq!(g.next_down(dec!(1000)).unwrap(), dec!(999));
    }

    #[test]
    fn test_inside_band_is_symmetric() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_up(dec!(20)).unwrap(), dec!(20.05));
        assert_eq!(g.next_down(dec!(20)).unwrap(), dec!(19.95));
    }

    #[test]
    fn test_initial_ladder_across_hundred() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        let ladder = g.build_initial_ladder(dec!(100.00), 5).unwrap();
        let expected = vec![
            dec!(99.5), dec!(99.6), dec!(99.7), dec!(99.8), dec!(99.9),
            dec!(100),
            dec!(100.5), dec!(101), dec!(101.5), dec!(102), dec!(102.5),
        ];
        assert_eq!(ladder, expected);
    }

    #[test]
    fn test_initial_ladder_inside_band() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        let ladder = g.build_initial_ladder(dec!(200), 5).unwrap();
        let expected = vec![
            dec!(197.5), dec!(198), dec!(198.5), dec!(199), dec!(199.5),
            dec!(200),
            dec!(200.5), dec!(201), dec!(201.5), dec!(202), dec!(202.5),
        ];
        assert_eq!(ladder, expected);
        assert!(ladder.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_run_down_is_closest_first() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        let run = g.run_down(dec!(10.10), 5).unwrap();
        assert_eq!(run, vec![dec!(10.05), dec!(10.00), dec!(9.99), dec!(9.98), dec!(9.97)]);
    }

    #[test]
    fn test_run_up_crosses_fifty() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        let run = g.run_up(dec!(49.80), 5).unwrap();
        assert_eq!(run, vec![dec!(49.85), dec!(49.90), dec!(49.95), dec!(50.00), dec!(50.10)]);
    }

    #[test]
    fn test_long_walk_has_no_drift() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        let up = g.run_up(dec!(9.50), 2000).unwrap();
        let top = *up.last().unwrap();
        let down = g.run_down(top, 2000).unwrap();
        assert_eq!(*down.last().unwrap(), dec!(9.50));
    }

    #[test]
    fn test_ceiling_is_an_error() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_up(Decimal::MAX), Err(SimError::AmountOverflow));
        assert!(g.run_up(Decimal::MAX - dec!(5), 2).is_err());
    }

    #[test]
    fn test_floor_is_an_error() {
        let s = canonical();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_down(dec!(0.02)).unwrap(), dec!(0.01));
        assert_eq!(g.next_down(dec!(0.01)), Err(SimError::LadderFloor { from: dec!(0.01) }));
        assert!(g.build_initial_ladder(dec!(0.03), 5).is_err());
    }

    #[test]
    fn test_uniform_step() {
        let s = TickSchedule::uniform(dec!(1)).unwrap();
        let g = PriceLadderGenerator::new(&s);
        assert_eq!(g.next_up(dec!(10)).unwrap(), dec!(11));
        assert_eq!(g.next_down(dec!(10)).unwrap(), dec!(9));
        assert_eq!(g.next_down(dec!(100)).unwrap(), dec!(99));
    }
}
