//! Double-entry validation of a candidate line set.
//!
//! Pure: runs to completion before any persistence is attempted, so a
//! rejected entry never leaves partial writes behind.

use rust_decimal::Decimal;

use openbooks_core::{LedgerError, LedgerResult};

use crate::entry::LineInput;
use crate::money;

/// Validate a candidate line set against the double-entry rules.
///
/// Rules are checked in order, each with its own error kind: at least two
/// lines, no negative amounts, no line with both sides, no line with neither
/// side, and totals balanced within the tolerance. Line indexes in errors are
/// 1-based.
pub fn validate_lines(lines: &[LineInput]) -> LedgerResult<()> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }
    for (idx, line) in lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: idx + 1 });
        }
    }
    for (idx, line) in lines.iter().enumerate() {
        if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
            return Err(LedgerError::AmbiguousLine { line: idx + 1 });
        }
    }
    for (idx, line) in lines.iter().enumerate() {
        if line.debit == Decimal::ZERO && line.credit == Decimal::ZERO {
            return Err(LedgerError::EmptyLine { line: idx + 1 });
        }
    }

    let debits = lines.iter().fold(Decimal::ZERO, |acc, l| acc + l.debit);
    let credits = lines.iter().fold(Decimal::ZERO, |acc, l| acc + l.credit);
    if !money::within_tolerance(debits, credits) {
        return Err(LedgerError::UnbalancedEntry {
            debits: money::round2(debits),
            credits: money::round2(credits),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use openbooks_core::AccountId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn debit(amount: Decimal) -> LineInput {
        LineInput::debit(AccountId::new(), amount)
    }

    fn credit(amount: Decimal) -> LineInput {
        LineInput::credit(AccountId::new(), amount)
    }

    #[test]
    fn single_line_is_insufficient() {
        let err = validate_lines(&[debit(dec!(10))]).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientLines);
    }

    #[test]
    fn negative_amount_is_rejected_with_line_index() {
        let err = validate_lines(&[debit(dec!(10)), credit(dec!(-10))]).unwrap_err();
        assert_eq!(err, LedgerError::NegativeAmount { line: 2 });
    }

    #[test]
    fn line_with_both_sides_is_ambiguous() {
        let both = LineInput {
            account_id: AccountId::new(),
            debit: dec!(5),
            credit: dec!(5),
            description: None,
        };
        let err = validate_lines(&[both, credit(dec!(5))]).unwrap_err();
        assert_eq!(err, LedgerError::AmbiguousLine { line: 1 });
    }

    #[test]
    fn line_with_neither_side_is_empty() {
        let err = validate_lines(&[debit(dec!(5)), credit(dec!(5)), debit(dec!(0))]).unwrap_err();
        assert_eq!(err, LedgerError::EmptyLine { line: 3 });
    }

    #[test]
    fn unbalanced_totals_carry_both_sums() {
        let err = validate_lines(&[debit(dec!(300)), credit(dec!(250))]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnbalancedEntry {
                debits: dec!(300.00),
                credits: dec!(250.00),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("300.00") && msg.contains("250.00"), "{msg}");
    }

    #[test]
    fn one_cent_difference_is_within_tolerance() {
        validate_lines(&[debit(dec!(100.00)), credit(dec!(99.99))]).unwrap();
        let err = validate_lines(&[debit(dec!(100.00)), credit(dec!(99.98))]).unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));
    }

    proptest! {
        /// Any entry assembled from matching debit/credit pairs validates.
        #[test]
        fn balanced_pairs_always_validate(cents in prop::collection::vec(1i64..1_000_000i64, 1..8)) {
            let mut lines = Vec::new();
            for c in cents {
                let amount = Decimal::new(c, 2);
                lines.push(debit(amount));
                lines.push(credit(amount));
            }
            prop_assert!(validate_lines(&lines).is_ok());
        }

        /// Skewing one side by more than a cent always fails as unbalanced.
        #[test]
        fn skewed_totals_are_unbalanced(cents in 1i64..1_000_000i64, skew in 2i64..10_000i64) {
            let amount = Decimal::new(cents, 2);
            let skewed = Decimal::new(cents + skew, 2);
            let lines = [debit(amount), credit(skewed)];
            prop_assert!(
                matches!(
                    validate_lines(&lines),
                    Err(LedgerError::UnbalancedEntry { .. })
                ),
                "expected UnbalancedEntry error"
            );
        }
    }
}
