//! Human-readable entry numbers: `JE-<year>-<seq>`.
//!
//! Sequences are scoped per tenant per calendar year of the entry date and
//! reset to 1 each year.

use openbooks_core::{LedgerResult, TenantId};

use crate::store::LedgerStore;

pub const ENTRY_PREFIX: &str = "JE";

/// The `JE-<year>-` prefix shared by all of one year's numbers.
pub fn year_prefix(year: i32) -> String {
    format!("{ENTRY_PREFIX}-{year}-")
}

/// Format a number. Sequences are zero-padded to 4 digits and widen past
/// 9999.
pub fn format_number(year: i32, sequence: u32) -> String {
    format!("{ENTRY_PREFIX}-{year}-{sequence:04}")
}

/// Parse the sequence out of a number carrying the given year's prefix.
pub fn sequence_of(number: &str, year: i32) -> Option<u32> {
    number.strip_prefix(&year_prefix(year))?.parse().ok()
}

/// Allocate the next number for the tenant and year: maximum existing
/// sequence under the year prefix, plus one.
///
/// The read and the subsequent entry insert are not one transaction at this
/// level; the store's uniqueness guarantee on entry numbers is the backstop,
/// and the lifecycle retries allocation when it trips.
pub fn next_entry_number<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    year: i32,
) -> LedgerResult<String> {
    let prefix = year_prefix(year);
    let numbers = store.entry_numbers(tenant_id, &prefix)?;
    let max = numbers
        .iter()
        .filter_map(|n| sequence_of(n, year))
        .max()
        .unwrap_or(0);
    Ok(format_number(year, max + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_four_digit_padding() {
        assert_eq!(format_number(2026, 1), "JE-2026-0001");
        assert_eq!(format_number(2026, 412), "JE-2026-0412");
    }

    #[test]
    fn sequences_widen_past_9999() {
        assert_eq!(format_number(2026, 10000), "JE-2026-10000");
        assert_eq!(sequence_of("JE-2026-10000", 2026), Some(10000));
    }

    #[test]
    fn parses_only_matching_year() {
        assert_eq!(sequence_of("JE-2026-0042", 2026), Some(42));
        assert_eq!(sequence_of("JE-2025-0042", 2026), None);
        assert_eq!(sequence_of("JE-2026-x", 2026), None);
    }
}
