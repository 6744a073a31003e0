//! # engine::projector
//!
//! **ResultProjector**: turns a ladder into the table the shell renders.
//! Deduplicates, sorts ascending, settles every price against the fixed entry.
//! Holds no state; projecting the same ladder twice yields the same rows.

use std::collections::BTreeSet;

use crate::engine::settlement::SettlementCalculator;
use crate::error::SimError;
use crate::models::{Price, SettlementRow, TradeParameters};

#[derive(Debug, Clone, Copy)]
pub struct ResultProjector<'a> {
    calculator: &'a SettlementCalculator,
}

impl<'a> ResultProjector<'a> {
    pub fn new(calculator: &'a SettlementCalculator) -> Self {
        Self { calculator }
    }

    pub fn project<I>(&self, ladder: I, params: &TradeParameters) -> Result<Vec<SettlementRow>, SimError>
    where
        I: IntoIterator<Item = Price>,
    {
        let entry = params.entry_price();

        // BTreeSet compares numerically, so 100.5 and 100.50 collapse.
        let prices: BTreeSet<Price> = ladder.into_iter().collect();

        prices
            .into_iter()
            .map(|exit| {
                let result = self.calculator.settle(params, exit)?;
                Ok(SettlementRow::new(entry, exit, &result))
            })
            .collect()
    }
}
