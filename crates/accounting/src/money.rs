//! Monetary rounding and comparison helpers.
//!
//! All amounts are [`Decimal`] currency units. Running balances are stored at
//! 2 decimal places; balance comparisons use a 0.01 tolerance.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to 2 decimal places, midpoints away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Comparison tolerance: one cent.
pub fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// True when `a` and `b` differ by at most the tolerance.
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= tolerance()
}
