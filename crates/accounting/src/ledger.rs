//! General ledger rows and the posting builder.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{
    AccountId, JournalEntryId, JournalLineId, LedgerError, LedgerResult, TenantId,
};

use crate::account::{Account, AccountKind};
use crate::entry::{JournalEntry, JournalEntryLine};
use crate::money;
use crate::store::LedgerStore;

/// Signed effect of a debit/credit pair on an account's balance.
///
/// Debit-normal accounts (Asset, Expense) increase on debit; credit-normal
/// accounts (Liability, Equity, Revenue) increase on credit.
pub fn signed_delta(kind: AccountKind, debit: Decimal, credit: Decimal) -> Decimal {
    if kind.debit_normal() {
        debit - credit
    } else {
        credit - debit
    }
}

/// A ledger row built for a posting but not yet committed (no sequence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLedgerRow {
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub entry_id: JournalEntryId,
    pub line_id: JournalLineId,
    pub entry_date: NaiveDate,
    pub debit: Decimal,
    pub credit: Decimal,
    /// The account's balance immediately after this row.
    pub running_balance: Decimal,
    pub description: String,
    pub reference: Option<String>,
}

impl PendingLedgerRow {
    pub fn into_record(self, sequence: u64) -> GeneralLedgerRecord {
        GeneralLedgerRecord {
            sequence,
            tenant_id: self.tenant_id,
            account_id: self.account_id,
            entry_id: self.entry_id,
            line_id: self.line_id,
            entry_date: self.entry_date,
            debit: self.debit,
            credit: self.credit,
            running_balance: self.running_balance,
            description: self.description,
            reference: self.reference,
        }
    }
}

/// One committed row of the general ledger.
///
/// Append-only: amounts never change after commit. The reconciler is the only
/// writer permitted to rewrite `running_balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerRecord {
    /// Per-tenant position assigned by the store at commit; with the entry
    /// date it gives the canonical replay order.
    pub sequence: u64,
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub entry_id: JournalEntryId,
    pub line_id: JournalLineId,
    pub entry_date: NaiveDate,
    pub debit: Decimal,
    pub credit: Decimal,
    pub running_balance: Decimal,
    pub description: String,
    pub reference: Option<String>,
}

/// The full effect of posting one entry: rows to append plus the final
/// balance per touched account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub rows: Vec<PendingLedgerRow>,
    pub balances: Vec<(AccountId, Decimal)>,
}

/// Build the ledger rows for an entry's lines, in authored order.
///
/// The prior balance for an account comes from the in-batch carry-forward
/// first, so several lines of one entry against the same account chain their
/// running balances without re-reading storage; otherwise from the latest
/// committed row; otherwise from the account's opening balance. (Rows of the
/// entry being posted are not committed yet, so the latest-row read cannot
/// observe them.) Each running balance is rounded to 2 decimal places.
pub fn build_posting<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    entry: &JournalEntry,
    lines: &[JournalEntryLine],
) -> LedgerResult<Posting> {
    let mut accounts: HashMap<AccountId, Account> = HashMap::new();
    let mut carried: HashMap<AccountId, Decimal> = HashMap::new();
    let mut touched: Vec<AccountId> = Vec::new();
    let mut rows = Vec::with_capacity(lines.len());

    for line in lines {
        if !accounts.contains_key(&line.account_id) {
            let account = store
                .account(tenant_id, line.account_id)?
                .ok_or(LedgerError::AccountNotFound)?;
            accounts.insert(line.account_id, account);
        }
        let account = &accounts[&line.account_id];

        let prior = match carried.get(&line.account_id) {
            Some(balance) => *balance,
            None => match store.latest_ledger_row(tenant_id, line.account_id)? {
                Some(row) => row.running_balance,
                None => account.opening_balance,
            },
        };
        let next = money::round2(prior + signed_delta(account.kind, line.debit, line.credit));
        if carried.insert(line.account_id, next).is_none() {
            touched.push(line.account_id);
        }

        rows.push(PendingLedgerRow {
            tenant_id,
            account_id: line.account_id,
            entry_id: entry.id,
            line_id: line.id,
            entry_date: entry.entry_date,
            debit: line.debit,
            credit: line.credit,
            running_balance: next,
            description: line
                .description
                .clone()
                .unwrap_or_else(|| entry.description.clone()),
            reference: entry.reference.as_ref().map(|r| r.label()),
        });
    }

    let balances = touched.into_iter().map(|id| (id, carried[&id])).collect();
    Ok(Posting { rows, balances })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn signed_delta_follows_normal_side() {
        assert_eq!(signed_delta(AccountKind::Asset, dec!(100), dec!(0)), dec!(100));
        assert_eq!(signed_delta(AccountKind::Asset, dec!(0), dec!(40)), dec!(-40));
        assert_eq!(signed_delta(AccountKind::Revenue, dec!(0), dec!(100)), dec!(100));
        assert_eq!(signed_delta(AccountKind::Revenue, dec!(25), dec!(0)), dec!(-25));
        assert_eq!(signed_delta(AccountKind::Liability, dec!(10), dec!(30)), dec!(20));
    }

    #[test]
    fn pending_row_keeps_fields_through_commit() {
        let row = PendingLedgerRow {
            tenant_id: TenantId::new(),
            account_id: AccountId::new(),
            entry_id: JournalEntryId::new(),
            line_id: JournalLineId::new(),
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            debit: dec!(500),
            credit: dec!(0),
            running_balance: dec!(500),
            description: "Invoice 42".to_string(),
            reference: Some("invoice:42".to_string()),
        };
        let record = row.clone().into_record(7);
        assert_eq!(record.sequence, 7);
        assert_eq!(record.running_balance, row.running_balance);
        assert_eq!(record.reference, row.reference);
    }
}
