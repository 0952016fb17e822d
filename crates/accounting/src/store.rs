//! Repository boundary for the engine.
//!
//! The engine is abstracted from any concrete storage technology; it depends
//! only on this trait. Each method is an atomic unit: implementations must
//! persist everything a method writes or nothing at all, and must serialize
//! conflicting writers per tenant (transaction-level locking in a SQL
//! adapter; a process-wide write lock in the in-memory one).

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use openbooks_core::{AccountId, JournalEntryId, LedgerError, TenantId};

use crate::account::{Account, AccountFilter};
use crate::entry::{JournalEntry, JournalEntryLine};
use crate::ledger::{GeneralLedgerRecord, PendingLedgerRow};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage adapter failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness or state precondition failed inside the store
    /// (duplicate entry number, entry no longer draft at commit, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A record the operation addressed does not exist.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// The backend itself failed (IO, poisoned lock, connection loss).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Bounds for a general ledger query. Unset bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    pub account_id: Option<AccountId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Tenant-scoped transactional store for accounts, journal entries and the
/// general ledger.
pub trait LedgerStore: Send + Sync {
    // ---- chart of accounts ----

    /// Insert a new account. Fails with [`StoreError::Conflict`] when the
    /// tenant already has an account with the same code.
    fn insert_account(&self, account: Account) -> StoreResult<()>;

    /// Replace an existing account record.
    fn update_account(&self, account: Account) -> StoreResult<()>;

    fn account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>>;

    fn account_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Account>>;

    /// List accounts matching the filter, ordered by code.
    fn accounts(&self, tenant_id: TenantId, filter: &AccountFilter) -> StoreResult<Vec<Account>>;

    // ---- journal entries ----

    /// Insert an entry and its lines atomically. Fails with
    /// [`StoreError::Conflict`] when the tenant already has an entry with the
    /// same number, so concurrent creations can never both claim one.
    fn insert_entry(&self, entry: JournalEntry, lines: Vec<JournalEntryLine>) -> StoreResult<()>;

    fn entry(&self, tenant_id: TenantId, id: JournalEntryId)
    -> StoreResult<Option<JournalEntry>>;

    /// Lines of an entry in authored (position) order.
    fn entry_lines(
        &self,
        tenant_id: TenantId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>>;

    fn entry_by_reference(
        &self,
        tenant_id: TenantId,
        reference_type: &str,
        reference_id: &str,
    ) -> StoreResult<Option<JournalEntry>>;

    /// All entry numbers of the tenant starting with `prefix` (the per-year
    /// number allocation scans these for the maximum sequence).
    fn entry_numbers(&self, tenant_id: TenantId, prefix: &str) -> StoreResult<Vec<String>>;

    // ---- general ledger ----

    /// The most recent committed row for an account, by entry date then
    /// sequence.
    fn latest_ledger_row(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> StoreResult<Option<GeneralLedgerRecord>>;

    /// Rows matching the query, ordered by entry date then sequence.
    fn ledger_rows(
        &self,
        tenant_id: TenantId,
        query: &LedgerQuery,
    ) -> StoreResult<Vec<GeneralLedgerRecord>>;

    /// Commit a posting as one atomic unit: persist the flipped entry record,
    /// append the rows (assigning monotonically increasing per-tenant
    /// sequences), and set each touched account's current balance. Fails with
    /// [`StoreError::Conflict`] when the stored entry is no longer draft, so
    /// two concurrent posts of one entry cannot both commit.
    fn commit_posting(
        &self,
        tenant_id: TenantId,
        entry: JournalEntry,
        rows: Vec<PendingLedgerRow>,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<Vec<GeneralLedgerRecord>>;

    /// Apply one account's reconciliation atomically: rewrite the stored
    /// running balance of the addressed rows (never their amounts) and,
    /// when given, the account's current balance. Each account's correction
    /// is its own transaction so an interrupted batch keeps what committed.
    fn apply_reconciliation(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        corrections: &[(u64, Decimal)],
        new_balance: Option<Decimal>,
    ) -> StoreResult<()>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn insert_account(&self, account: Account) -> StoreResult<()> {
        (**self).insert_account(account)
    }

    fn update_account(&self, account: Account) -> StoreResult<()> {
        (**self).update_account(account)
    }

    fn account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>> {
        (**self).account(tenant_id, id)
    }

    fn account_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Account>> {
        (**self).account_by_code(tenant_id, code)
    }

    fn accounts(&self, tenant_id: TenantId, filter: &AccountFilter) -> StoreResult<Vec<Account>> {
        (**self).accounts(tenant_id, filter)
    }

    fn insert_entry(&self, entry: JournalEntry, lines: Vec<JournalEntryLine>) -> StoreResult<()> {
        (**self).insert_entry(entry, lines)
    }

    fn entry(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
    ) -> StoreResult<Option<JournalEntry>> {
        (**self).entry(tenant_id, id)
    }

    fn entry_lines(
        &self,
        tenant_id: TenantId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>> {
        (**self).entry_lines(tenant_id, entry_id)
    }

    fn entry_by_reference(
        &self,
        tenant_id: TenantId,
        reference_type: &str,
        reference_id: &str,
    ) -> StoreResult<Option<JournalEntry>> {
        (**self).entry_by_reference(tenant_id, reference_type, reference_id)
    }

    fn entry_numbers(&self, tenant_id: TenantId, prefix: &str) -> StoreResult<Vec<String>> {
        (**self).entry_numbers(tenant_id, prefix)
    }

    fn latest_ledger_row(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> StoreResult<Option<GeneralLedgerRecord>> {
        (**self).latest_ledger_row(tenant_id, account_id)
    }

    fn ledger_rows(
        &self,
        tenant_id: TenantId,
        query: &LedgerQuery,
    ) -> StoreResult<Vec<GeneralLedgerRecord>> {
        (**self).ledger_rows(tenant_id, query)
    }

    fn commit_posting(
        &self,
        tenant_id: TenantId,
        entry: JournalEntry,
        rows: Vec<PendingLedgerRow>,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<Vec<GeneralLedgerRecord>> {
        (**self).commit_posting(tenant_id, entry, rows, balances)
    }

    fn apply_reconciliation(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        corrections: &[(u64, Decimal)],
        new_balance: Option<Decimal>,
    ) -> StoreResult<()> {
        (**self).apply_reconciliation(tenant_id, account_id, corrections, new_balance)
    }
}
