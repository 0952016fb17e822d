//! Journal entries: entry records, lines, and the status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{AccountId, JournalEntryId, JournalLineId, TenantId, UserId};

/// Journal entry lifecycle status.
///
/// A closed set with an explicit transition table: `Draft -> Posted` and
/// `Posted -> Reversed`. Everything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Posted,
    Reversed,
}

impl EntryStatus {
    pub fn can_transition(self, next: EntryStatus) -> bool {
        matches!(
            (self, next),
            (EntryStatus::Draft, EntryStatus::Posted)
                | (EntryStatus::Posted, EntryStatus::Reversed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Posted => "posted",
            EntryStatus::Reversed => "reversed",
        }
    }
}

impl core::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External reference identifying the domain record an entry was posted from.
///
/// Posting adapters use the `(reference_type, reference_id)` pair for
/// idempotent auto-posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryReference {
    pub reference_type: String,
    pub reference_id: String,
}

impl EntryReference {
    pub fn new(reference_type: impl Into<String>, reference_id: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            reference_id: reference_id.into(),
        }
    }

    /// Short `type:id` label carried onto ledger rows.
    pub fn label(&self) -> String {
        format!("{}:{}", self.reference_type, self.reference_id)
    }
}

/// A balanced, dated group of debit/credit lines representing one business
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub tenant_id: TenantId,
    /// Human-readable sequential number, e.g. `JE-2026-0001`.
    pub number: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference: Option<EntryReference>,
    pub status: EntryStatus,
    pub created_by: UserId,
    pub posted_by: Option<UserId>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// One side of a journal entry. Exactly one of `debit`/`credit` is strictly
/// positive; lines are immutable once the parent entry is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    pub id: JournalLineId,
    pub entry_id: JournalEntryId,
    pub account_id: AccountId,
    /// Authored order within the entry; the poster walks lines in this order.
    pub position: u32,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: Option<String>,
}

/// Candidate line supplied by callers and posting adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub account_id: AccountId,
    pub debit: Decimal,
    pub credit: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

impl LineInput {
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for journal entry creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub entry_date: NaiveDate,
    pub description: String,
    pub lines: Vec<LineInput>,
    #[serde(default)]
    pub reference: Option<EntryReference>,
    pub created_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_exactly_draft_posted_reversed() {
        use EntryStatus::*;
        let legal = [(Draft, Posted), (Posted, Reversed)];
        for from in [Draft, Posted, Reversed] {
            for to in [Draft, Posted, Reversed] {
                assert_eq!(
                    from.can_transition(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn reference_label_joins_type_and_id() {
        assert_eq!(EntryReference::new("invoice", "42").label(), "invoice:42");
    }
}
