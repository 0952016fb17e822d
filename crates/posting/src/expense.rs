//! Expense posting: debit operating expense, credit cash or payable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_accounting::{
    EntryReference, JournalEntry, Ledger, LedgerStore, LineInput, NewJournalEntry,
};
use openbooks_core::{LedgerResult, TenantId, UserId};

use crate::chart::{self, required_account};

pub const EXPENSE_REFERENCE: &str = "expense";

/// A recorded business expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub incurred_on: NaiveDate,
    /// Paid immediately from cash; otherwise it accrues as a payable.
    pub paid: bool,
}

/// Post the accounting effect of a recorded expense: debit Operating Expense,
/// credit Cash when paid or Accounts Payable when accrued.
///
/// Idempotent on the expense id.
pub fn post_from_expense<S: LedgerStore>(
    ledger: &Ledger<S>,
    tenant_id: TenantId,
    expense: &Expense,
    actor: UserId,
) -> LedgerResult<JournalEntry> {
    if let Some(existing) =
        ledger.find_entry_by_reference(tenant_id, EXPENSE_REFERENCE, &expense.id)?
    {
        tracing::debug!(
            "expense {} already posted as entry {}",
            expense.id,
            existing.number
        );
        return Ok(existing);
    }

    let operating = required_account(ledger, tenant_id, chart::OPERATING_EXPENSE)?;
    let offset_code = if expense.paid {
        chart::CASH
    } else {
        chart::ACCOUNTS_PAYABLE
    };
    let offset = required_account(ledger, tenant_id, offset_code)?;

    let entry = ledger.create_entry(
        tenant_id,
        NewJournalEntry {
            entry_date: expense.incurred_on,
            description: format!("Expense {}: {}", expense.id, expense.description),
            lines: vec![
                LineInput::debit(operating.id, expense.amount),
                LineInput::credit(offset.id, expense.amount),
            ],
            reference: Some(EntryReference::new(EXPENSE_REFERENCE, expense.id.clone())),
            created_by: actor,
        },
    )?;
    ledger.post_entry(tenant_id, entry.id, actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openbooks_infra::InMemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn expense(paid: bool) -> Expense {
        Expense {
            id: "EXP-9".to_string(),
            description: "Office supplies".to_string(),
            amount: dec!(75.50),
            incurred_on: NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
            paid,
        }
    }

    fn setup() -> (Ledger<InMemoryLedgerStore>, TenantId, UserId) {
        let ledger = Ledger::new(InMemoryLedgerStore::new());
        let tenant = TenantId::new();
        chart::bootstrap_chart(&ledger, tenant).unwrap();
        (ledger, tenant, UserId::new())
    }

    #[test]
    fn paid_expense_credits_cash() {
        let (ledger, tenant, user) = setup();
        post_from_expense(&ledger, tenant, &expense(true), user).unwrap();

        let cash = ledger
            .store()
            .account_by_code(tenant, chart::CASH)
            .unwrap()
            .unwrap();
        let operating = ledger
            .store()
            .account_by_code(tenant, chart::OPERATING_EXPENSE)
            .unwrap()
            .unwrap();
        assert_eq!(cash.current_balance, dec!(-75.50));
        assert_eq!(operating.current_balance, dec!(75.50));
    }

    #[test]
    fn accrued_expense_credits_payable() {
        let (ledger, tenant, user) = setup();
        post_from_expense(&ledger, tenant, &expense(false), user).unwrap();

        let payable = ledger
            .store()
            .account_by_code(tenant, chart::ACCOUNTS_PAYABLE)
            .unwrap()
            .unwrap();
        assert_eq!(payable.current_balance, dec!(75.50));
    }

    #[test]
    fn reposting_returns_the_original_entry() {
        let (ledger, tenant, user) = setup();
        let first = post_from_expense(&ledger, tenant, &expense(true), user).unwrap();
        let second = post_from_expense(&ledger, tenant, &expense(true), user).unwrap();
        assert_eq!(first.id, second.id);
    }
}
