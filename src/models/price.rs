//! # models::price
//!
//! [`Price`] is a `rust_decimal::Decimal`: exact base-10 arithmetic, so a
//! ladder walked a thousand ticks up and back down lands exactly where it
//! started.  Floats are never used for prices or notionals.
//!
//! Every outward-facing price is quoted to two fractional digits.

use rust_decimal::Decimal;
use serde::Serializer;

/// A price in currency units.
pub type Price = Decimal;

/// Fractional digits used when quoting a price to the user.
pub const QUOTE_DP: u32 = 2;

/// Quote a price the way the form displays it, e.g. `100.5` → `"100.50"`.
#[inline]
pub fn quote(price: Price) -> String {
    format!("{:.*}", QUOTE_DP as usize, price)
}

/// `serialize_with` helper so JSON carries `"100.50"` instead of `"100.5"`.
pub fn serialize_quote<S>(price: &Price, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&quote(*price))
}
