//! The engine's service facade: the in-process boundary consumed by the
//! surrounding application.
//!
//! Every operation takes the tenant id explicitly; the engine never defaults
//! it.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{AccountId, JournalEntryId, LedgerError, LedgerResult, TenantId, UserId};

use crate::account::{self, Account, AccountFilter, AccountUpdate, NewAccount};
use crate::entry::{JournalEntry, NewJournalEntry};
use crate::journal;
use crate::ledger::signed_delta;
use crate::money;
use crate::reconcile::{self, RecalculationSummary};
use crate::statements::{self, BalanceSheetReport, ProfitAndLossReport, TrialBalanceReport};
use crate::store::{LedgerQuery, LedgerStore};

/// A general ledger row joined with account and entry summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRowView {
    pub sequence: u64,
    pub entry_date: NaiveDate,
    pub account_id: AccountId,
    pub account_code: String,
    pub account_name: String,
    pub entry_id: JournalEntryId,
    pub entry_number: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub running_balance: Decimal,
    pub description: String,
    pub reference: Option<String>,
}

/// One replayed row of an account diagnostic: stored vs recalculated running
/// balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRow {
    pub sequence: u64,
    pub entry_id: JournalEntryId,
    pub entry_date: NaiveDate,
    pub debit: Decimal,
    pub credit: Decimal,
    pub stored_running_balance: Decimal,
    pub calculated_running_balance: Decimal,
    pub matches: bool,
}

/// Snapshot of one account with its full replayed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDiagnostics {
    pub account: Account,
    pub rows: Vec<DiagnosticRow>,
    /// Final balance from the replay.
    pub calculated_balance: Decimal,
    /// True when any row or the current balance drifted beyond tolerance.
    pub has_discrepancy: bool,
}

/// The accounting ledger engine.
pub struct Ledger<S> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- chart of accounts ----

    pub fn create_account(&self, tenant_id: TenantId, new: NewAccount) -> LedgerResult<Account> {
        let account = account::create_account(&self.store, tenant_id, new)?;
        tracing::info!(
            "created account {} '{}' for tenant {}",
            account.code,
            account.name,
            tenant_id
        );
        Ok(account)
    }

    /// Apply a partial update. An opening-balance edit is followed by an
    /// automatic scoped recalculation of the account so the derived balance
    /// catches up; a recalculation failure is logged, never failing the
    /// update itself.
    pub fn update_account(
        &self,
        tenant_id: TenantId,
        id: AccountId,
        update: AccountUpdate,
    ) -> LedgerResult<Account> {
        let opening_changed = update.opening_balance.is_some();
        let account = account::update_account(&self.store, tenant_id, id, update)?;
        if !opening_changed {
            return Ok(account);
        }

        match reconcile::recalculate(&self.store, tenant_id, Some(id)) {
            Ok(summary) => {
                tracing::info!(
                    "recalculated account {} after opening balance edit ({} rows corrected)",
                    account.code,
                    summary.rows_corrected
                );
            }
            Err(err) => {
                tracing::warn!(
                    "recalculation after opening balance edit of account {} failed: {err}",
                    account.code
                );
                return Ok(account);
            }
        }
        // Return the refreshed snapshot so callers see the caught-up balance.
        Ok(self.store.account(tenant_id, id)?.unwrap_or(account))
    }

    pub fn list_accounts(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> LedgerResult<Vec<Account>> {
        account::list_accounts(&self.store, tenant_id, filter)
    }

    // ---- journal ----

    pub fn create_entry(
        &self,
        tenant_id: TenantId,
        new: NewJournalEntry,
    ) -> LedgerResult<JournalEntry> {
        let entry = journal::create_entry(&self.store, tenant_id, new)?;
        tracing::info!(
            "created draft entry {} for tenant {}",
            entry.number,
            tenant_id
        );
        Ok(entry)
    }

    pub fn post_entry(
        &self,
        tenant_id: TenantId,
        entry_id: JournalEntryId,
        poster: UserId,
    ) -> LedgerResult<JournalEntry> {
        let entry = journal::post_entry(&self.store, tenant_id, entry_id, poster)?;
        tracing::info!("posted entry {} for tenant {}", entry.number, tenant_id);
        Ok(entry)
    }

    pub fn find_entry_by_reference(
        &self,
        tenant_id: TenantId,
        reference_type: &str,
        reference_id: &str,
    ) -> LedgerResult<Option<JournalEntry>> {
        Ok(self
            .store
            .entry_by_reference(tenant_id, reference_type, reference_id)?)
    }

    // ---- general ledger ----

    /// Ledger rows matching the query, joined with account and entry
    /// summaries, in entry date then sequence order.
    pub fn query_ledger(
        &self,
        tenant_id: TenantId,
        query: &LedgerQuery,
    ) -> LedgerResult<Vec<LedgerRowView>> {
        let rows = self.store.ledger_rows(tenant_id, query)?;

        let mut accounts: HashMap<AccountId, Account> = HashMap::new();
        let mut entries: HashMap<JournalEntryId, JournalEntry> = HashMap::new();
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            if !accounts.contains_key(&row.account_id) {
                let account = self
                    .store
                    .account(tenant_id, row.account_id)?
                    .ok_or(LedgerError::AccountNotFound)?;
                accounts.insert(row.account_id, account);
            }
            if !entries.contains_key(&row.entry_id) {
                let entry = self
                    .store
                    .entry(tenant_id, row.entry_id)?
                    .ok_or(LedgerError::EntryNotFound)?;
                entries.insert(row.entry_id, entry);
            }
            let account = &accounts[&row.account_id];
            let entry = &entries[&row.entry_id];
            views.push(LedgerRowView {
                sequence: row.sequence,
                entry_date: row.entry_date,
                account_id: row.account_id,
                account_code: account.code.clone(),
                account_name: account.name.clone(),
                entry_id: row.entry_id,
                entry_number: entry.number.clone(),
                debit: row.debit,
                credit: row.credit,
                running_balance: row.running_balance,
                description: row.description,
                reference: row.reference,
            });
        }
        Ok(views)
    }

    // ---- statements ----

    pub fn trial_balance(
        &self,
        tenant_id: TenantId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<TrialBalanceReport> {
        statements::trial_balance(&self.store, tenant_id, from, to)
    }

    pub fn profit_and_loss(
        &self,
        tenant_id: TenantId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<ProfitAndLossReport> {
        statements::profit_and_loss(&self.store, tenant_id, from, to)
    }

    /// Balance sheet as of the given date (today when unset).
    pub fn balance_sheet(
        &self,
        tenant_id: TenantId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<BalanceSheetReport> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        statements::balance_sheet(&self.store, tenant_id, as_of)
    }

    // ---- reconciliation ----

    pub fn recalculate_balances(
        &self,
        tenant_id: TenantId,
        account_id: Option<AccountId>,
    ) -> LedgerResult<RecalculationSummary> {
        let summary = reconcile::recalculate(&self.store, tenant_id, account_id)?;
        if summary.discrepancies.is_empty() && summary.errors.is_empty() {
            tracing::info!(
                "recalculated {} accounts for tenant {}: no drift",
                summary.accounts_processed,
                tenant_id
            );
        } else {
            tracing::warn!(
                "recalculated {} accounts for tenant {}: {} discrepancies, {} rows corrected, {} errors",
                summary.accounts_processed,
                tenant_id,
                summary.discrepancies.len(),
                summary.rows_corrected,
                summary.errors.len()
            );
        }
        Ok(summary)
    }

    /// Read-only replay of one account: stored vs recalculated running
    /// balance per row, plus an overall discrepancy flag. Corrects nothing.
    pub fn account_diagnostics(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> LedgerResult<AccountDiagnostics> {
        let account = self
            .store
            .account(tenant_id, account_id)?
            .ok_or(LedgerError::AccountNotFound)?;
        let rows = self.store.ledger_rows(
            tenant_id,
            &LedgerQuery {
                account_id: Some(account_id),
                ..LedgerQuery::default()
            },
        )?;

        let mut running = account.opening_balance;
        let mut has_discrepancy = false;
        let mut diagnostic_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            running = money::round2(running + signed_delta(account.kind, row.debit, row.credit));
            let matches = money::within_tolerance(row.running_balance, running);
            has_discrepancy |= !matches;
            diagnostic_rows.push(DiagnosticRow {
                sequence: row.sequence,
                entry_id: row.entry_id,
                entry_date: row.entry_date,
                debit: row.debit,
                credit: row.credit,
                stored_running_balance: row.running_balance,
                calculated_running_balance: running,
                matches,
            });
        }
        has_discrepancy |= !money::within_tolerance(account.current_balance, running);

        Ok(AccountDiagnostics {
            account,
            rows: diagnostic_rows,
            calculated_balance: running,
            has_discrepancy,
        })
    }
}
