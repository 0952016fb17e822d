//! In-memory ledger store.
//!
//! Intended for tests/dev. Not optimized for performance. One `RwLock` guards
//! all state, so every write method is atomic and writers serialize across
//! the whole process (stricter than the per-tenant serialization the engine
//! requires of production adapters).

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use openbooks_accounting::account::{Account, AccountFilter};
use openbooks_accounting::entry::{EntryStatus, JournalEntry, JournalEntryLine};
use openbooks_accounting::ledger::{GeneralLedgerRecord, PendingLedgerRow};
use openbooks_accounting::store::{LedgerQuery, LedgerStore, StoreError, StoreResult};
use openbooks_core::{AccountId, JournalEntryId, TenantId};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<(TenantId, AccountId), Account>,
    entries: HashMap<(TenantId, JournalEntryId), JournalEntry>,
    lines: HashMap<(TenantId, JournalEntryId), Vec<JournalEntryLine>>,
    /// Append-only per tenant; sequences are assigned from `next_sequence`.
    rows: HashMap<TenantId, Vec<GeneralLedgerRecord>>,
    next_sequence: HashMap<TenantId, u64>,
}

#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

fn matches_query(row: &GeneralLedgerRecord, query: &LedgerQuery) -> bool {
    if query.account_id.is_some_and(|id| id != row.account_id) {
        return false;
    }
    if query.from.is_some_and(|from| row.entry_date < from) {
        return false;
    }
    if query.to.is_some_and(|to| row.entry_date > to) {
        return false;
    }
    true
}

impl LedgerStore for InMemoryLedgerStore {
    fn insert_account(&self, account: Account) -> StoreResult<()> {
        let mut state = self.write()?;
        let tenant_id = account.tenant_id;
        if state
            .accounts
            .iter()
            .any(|((t, _), a)| *t == tenant_id && a.code == account.code)
        {
            return Err(StoreError::Conflict(format!(
                "account code '{}' already exists",
                account.code
            )));
        }
        if state.accounts.contains_key(&(tenant_id, account.id)) {
            return Err(StoreError::Conflict("account id already exists".to_string()));
        }
        state.accounts.insert((tenant_id, account.id), account);
        Ok(())
    }

    fn update_account(&self, account: Account) -> StoreResult<()> {
        let mut state = self.write()?;
        let tenant_id = account.tenant_id;
        if state
            .accounts
            .iter()
            .any(|((t, id), a)| *t == tenant_id && *id != account.id && a.code == account.code)
        {
            return Err(StoreError::Conflict(format!(
                "account code '{}' already exists",
                account.code
            )));
        }
        let key = (tenant_id, account.id);
        if !state.accounts.contains_key(&key) {
            return Err(StoreError::NotFound("account"));
        }
        state.accounts.insert(key, account);
        Ok(())
    }

    fn account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.read()?.accounts.get(&(tenant_id, id)).cloned())
    }

    fn account_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<Account>> {
        let state = self.read()?;
        Ok(state
            .accounts
            .iter()
            .find(|((t, _), a)| *t == tenant_id && a.code == code)
            .map(|(_, a)| a.clone()))
    }

    fn accounts(&self, tenant_id: TenantId, filter: &AccountFilter) -> StoreResult<Vec<Account>> {
        let state = self.read()?;
        let mut accounts: Vec<Account> = state
            .accounts
            .iter()
            .filter(|((t, _), a)| {
                *t == tenant_id
                    && (filter.include_inactive || a.active)
                    && filter.kind.is_none_or(|k| k == a.kind)
            })
            .map(|(_, a)| a.clone())
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    fn insert_entry(&self, entry: JournalEntry, lines: Vec<JournalEntryLine>) -> StoreResult<()> {
        let mut state = self.write()?;
        let tenant_id = entry.tenant_id;
        if state
            .entries
            .iter()
            .any(|((t, _), e)| *t == tenant_id && e.number == entry.number)
        {
            return Err(StoreError::Conflict(format!(
                "entry number '{}' already exists",
                entry.number
            )));
        }
        let key = (tenant_id, entry.id);
        state.entries.insert(key, entry);
        state.lines.insert(key, lines);
        Ok(())
    }

    fn entry(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
    ) -> StoreResult<Option<JournalEntry>> {
        Ok(self.read()?.entries.get(&(tenant_id, id)).cloned())
    }

    fn entry_lines(
        &self,
        tenant_id: TenantId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>> {
        let state = self.read()?;
        let mut lines = state
            .lines
            .get(&(tenant_id, entry_id))
            .cloned()
            .unwrap_or_default();
        lines.sort_by_key(|l| l.position);
        Ok(lines)
    }

    fn entry_by_reference(
        &self,
        tenant_id: TenantId,
        reference_type: &str,
        reference_id: &str,
    ) -> StoreResult<Option<JournalEntry>> {
        let state = self.read()?;
        Ok(state
            .entries
            .iter()
            .find(|((t, _), e)| {
                *t == tenant_id
                    && e.reference.as_ref().is_some_and(|r| {
                        r.reference_type == reference_type && r.reference_id == reference_id
                    })
            })
            .map(|(_, e)| e.clone()))
    }

    fn entry_numbers(&self, tenant_id: TenantId, prefix: &str) -> StoreResult<Vec<String>> {
        let state = self.read()?;
        Ok(state
            .entries
            .iter()
            .filter(|((t, _), e)| *t == tenant_id && e.number.starts_with(prefix))
            .map(|(_, e)| e.number.clone())
            .collect())
    }

    fn latest_ledger_row(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> StoreResult<Option<GeneralLedgerRecord>> {
        let state = self.read()?;
        Ok(state
            .rows
            .get(&tenant_id)
            .and_then(|rows| {
                rows.iter()
                    .filter(|r| r.account_id == account_id)
                    .max_by_key(|r| (r.entry_date, r.sequence))
            })
            .cloned())
    }

    fn ledger_rows(
        &self,
        tenant_id: TenantId,
        query: &LedgerQuery,
    ) -> StoreResult<Vec<GeneralLedgerRecord>> {
        let state = self.read()?;
        let mut rows: Vec<GeneralLedgerRecord> = state
            .rows
            .get(&tenant_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_query(r, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by_key(|r| (r.entry_date, r.sequence));
        Ok(rows)
    }

    fn commit_posting(
        &self,
        tenant_id: TenantId,
        entry: JournalEntry,
        rows: Vec<PendingLedgerRow>,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<Vec<GeneralLedgerRecord>> {
        let mut state = self.write()?;
        let key = (tenant_id, entry.id);
        let stored = state.entries.get(&key).ok_or(StoreError::NotFound("entry"))?;
        // Check-and-commit under the write lock: a concurrent post of the
        // same entry cannot also get past this.
        if stored.status != EntryStatus::Draft {
            return Err(StoreError::Conflict(format!(
                "entry {} is no longer draft",
                stored.number
            )));
        }
        for (account_id, _) in balances {
            if !state.accounts.contains_key(&(tenant_id, *account_id)) {
                return Err(StoreError::NotFound("account"));
            }
        }

        let mut next = *state.next_sequence.get(&tenant_id).unwrap_or(&0);
        let mut committed = Vec::with_capacity(rows.len());
        for row in rows {
            next += 1;
            committed.push(row.into_record(next));
        }
        state.next_sequence.insert(tenant_id, next);
        state
            .rows
            .entry(tenant_id)
            .or_default()
            .extend(committed.iter().cloned());
        state.entries.insert(key, entry);
        for (account_id, balance) in balances {
            if let Some(account) = state.accounts.get_mut(&(tenant_id, *account_id)) {
                account.current_balance = *balance;
            }
        }
        Ok(committed)
    }

    fn apply_reconciliation(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        corrections: &[(u64, Decimal)],
        new_balance: Option<Decimal>,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        // Validate all addressed rows exist before touching any of them.
        {
            let rows = state.rows.get(&tenant_id);
            for (sequence, _) in corrections {
                let found = rows.is_some_and(|rows| {
                    rows.iter()
                        .any(|r| r.sequence == *sequence && r.account_id == account_id)
                });
                if !found {
                    return Err(StoreError::NotFound("ledger row"));
                }
            }
        }
        if let Some(rows) = state.rows.get_mut(&tenant_id) {
            for (sequence, balance) in corrections {
                for row in rows.iter_mut() {
                    if row.sequence == *sequence && row.account_id == account_id {
                        row.running_balance = *balance;
                    }
                }
            }
        }
        if let Some(balance) = new_balance {
            let account = state
                .accounts
                .get_mut(&(tenant_id, account_id))
                .ok_or(StoreError::NotFound("account"))?;
            account.current_balance = balance;
        }
        Ok(())
    }
}
