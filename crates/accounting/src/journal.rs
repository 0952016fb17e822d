//! Journal entry lifecycle: draft creation and posting.

use chrono::{Datelike, Utc};

use openbooks_core::{JournalEntryId, JournalLineId, LedgerError, LedgerResult, TenantId, UserId};

use crate::entry::{EntryStatus, JournalEntry, JournalEntryLine, NewJournalEntry};
use crate::ledger;
use crate::numbering;
use crate::store::{LedgerStore, StoreError};
use crate::validator;

/// Bounded retries for number allocation under concurrent creation; stores
/// that serialize creation per tenant never trip the retry.
const NUMBER_ALLOCATION_ATTEMPTS: usize = 3;

/// Validate, number and persist a draft entry with its lines, atomically.
/// Nothing is created when any step fails.
pub fn create_entry<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    new: NewJournalEntry,
) -> LedgerResult<JournalEntry> {
    validator::validate_lines(&new.lines)?;

    let year = new.entry_date.year();
    let mut last_conflict = String::new();
    for _ in 0..NUMBER_ALLOCATION_ATTEMPTS {
        let number = numbering::next_entry_number(store, tenant_id, year)?;
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            tenant_id,
            number,
            entry_date: new.entry_date,
            description: new.description.clone(),
            reference: new.reference.clone(),
            status: EntryStatus::Draft,
            created_by: new.created_by,
            posted_by: None,
            posted_at: None,
        };
        let lines: Vec<JournalEntryLine> = new
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| JournalEntryLine {
                id: JournalLineId::new(),
                entry_id: entry.id,
                account_id: line.account_id,
                position: idx as u32,
                debit: line.debit,
                credit: line.credit,
                description: line.description.clone(),
            })
            .collect();

        match store.insert_entry(entry.clone(), lines) {
            Ok(()) => return Ok(entry),
            Err(StoreError::Conflict(msg)) => {
                last_conflict = msg;
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(LedgerError::storage(format!(
        "entry number allocation kept conflicting: {last_conflict}"
    )))
}

/// Post a draft entry: build the ledger rows and commit rows, balance
/// updates and the status flip as one atomic unit.
pub fn post_entry<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    entry_id: JournalEntryId,
    poster: UserId,
) -> LedgerResult<JournalEntry> {
    let mut entry = store
        .entry(tenant_id, entry_id)?
        .ok_or(LedgerError::EntryNotFound)?;
    if !entry.status.can_transition(EntryStatus::Posted) {
        return Err(LedgerError::invalid_state(format!(
            "cannot post entry {} in status '{}'",
            entry.number, entry.status
        )));
    }

    let lines = store.entry_lines(tenant_id, entry_id)?;
    let posting = ledger::build_posting(store, tenant_id, &entry, &lines)?;

    entry.status = EntryStatus::Posted;
    entry.posted_by = Some(poster);
    entry.posted_at = Some(Utc::now());
    store.commit_posting(tenant_id, entry.clone(), posting.rows, &posting.balances)?;
    Ok(entry)
}
