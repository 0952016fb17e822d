//! Financial statements: trial balance, profit and loss, balance sheet.
//!
//! Purely derived read-only queries over accounts and ledger rows; nothing
//! here mutates state.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{AccountId, LedgerResult, TenantId};

use crate::account::{AccountFilter, AccountKind};
use crate::ledger::signed_delta;
use crate::money;
use crate::store::{LedgerQuery, LedgerStore};

/// Per-account trial balance columns. Balances are split onto the account's
/// normal side; a negative balance shows as a positive amount on the
/// opposite side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: AccountId,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub opening_debit: Decimal,
    pub opening_credit: Decimal,
    pub period_debit: Decimal,
    pub period_credit: Decimal,
    pub ending_debit: Decimal,
    pub ending_credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub rows: Vec<TrialBalanceRow>,
    pub total_period_debit: Decimal,
    pub total_period_credit: Decimal,
    pub total_ending_debit: Decimal,
    pub total_ending_credit: Decimal,
}

/// Itemized amount for one account on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account_id: AccountId,
    pub code: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub revenue: Vec<StatementLine>,
    pub expenses: Vec<StatementLine>,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    pub as_of: NaiveDate,
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    /// Profit-and-loss net income from January 1 of the as-of year through
    /// the as-of date.
    pub retained_earnings: Decimal,
    /// `total_assets == total_liabilities + total_equity + retained_earnings`
    /// within the tolerance.
    pub is_balanced: bool,
}

/// Split a normal-side-signed balance onto debit/credit columns.
pub fn split_normal(kind: AccountKind, amount: Decimal) -> (Decimal, Decimal) {
    let debit_side = kind.debit_normal() == (amount >= Decimal::ZERO);
    let magnitude = amount.abs();
    if debit_side {
        (magnitude, Decimal::ZERO)
    } else {
        (Decimal::ZERO, magnitude)
    }
}

/// Trial balance for a date range: per account, the opening balance at range
/// start (account opening plus pre-range activity), period debit/credit
/// totals, and the ending balance.
pub fn trial_balance<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> LedgerResult<TrialBalanceReport> {
    let accounts = store.accounts(
        tenant_id,
        &AccountFilter {
            kind: None,
            include_inactive: true,
        },
    )?;
    // One bounded-above scan; rows before `from` feed the opening column.
    let rows = store.ledger_rows(
        tenant_id,
        &LedgerQuery {
            account_id: None,
            from: None,
            to,
        },
    )?;

    #[derive(Default)]
    struct Activity {
        pre_signed: Decimal,
        period_debit: Decimal,
        period_credit: Decimal,
    }
    let mut activity: HashMap<AccountId, Activity> = HashMap::new();
    let kinds: HashMap<AccountId, AccountKind> =
        accounts.iter().map(|a| (a.id, a.kind)).collect();
    for row in &rows {
        let Some(kind) = kinds.get(&row.account_id) else {
            continue;
        };
        let slot = activity.entry(row.account_id).or_default();
        if from.is_some_and(|start| row.entry_date < start) {
            slot.pre_signed += signed_delta(*kind, row.debit, row.credit);
        } else {
            slot.period_debit += row.debit;
            slot.period_credit += row.credit;
        }
    }

    let mut report = TrialBalanceReport {
        from,
        to,
        rows: Vec::with_capacity(accounts.len()),
        total_period_debit: Decimal::ZERO,
        total_period_credit: Decimal::ZERO,
        total_ending_debit: Decimal::ZERO,
        total_ending_credit: Decimal::ZERO,
    };
    for account in &accounts {
        let slot = activity.remove(&account.id).unwrap_or_default();
        let opening_signed = account.opening_balance + slot.pre_signed;
        let ending_signed = opening_signed
            + signed_delta(account.kind, slot.period_debit, slot.period_credit);
        let (opening_debit, opening_credit) = split_normal(account.kind, opening_signed);
        let (ending_debit, ending_credit) = split_normal(account.kind, ending_signed);

        report.total_period_debit += slot.period_debit;
        report.total_period_credit += slot.period_credit;
        report.total_ending_debit += ending_debit;
        report.total_ending_credit += ending_credit;
        report.rows.push(TrialBalanceRow {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            kind: account.kind,
            opening_debit,
            opening_credit,
            period_debit: slot.period_debit,
            period_credit: slot.period_credit,
            ending_debit,
            ending_credit,
        });
    }
    Ok(report)
}

/// Profit and loss for a date range: net ledger activity of Revenue accounts
/// (credit minus debit) against Expense accounts (debit minus credit).
pub fn profit_and_loss<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> LedgerResult<ProfitAndLossReport> {
    let accounts = store.accounts(
        tenant_id,
        &AccountFilter {
            kind: None,
            include_inactive: true,
        },
    )?;
    let rows = store.ledger_rows(
        tenant_id,
        &LedgerQuery {
            account_id: None,
            from,
            to,
        },
    )?;

    let mut sums: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
    for row in &rows {
        let slot = sums.entry(row.account_id).or_default();
        slot.0 += row.debit;
        slot.1 += row.credit;
    }

    let mut report = ProfitAndLossReport {
        from,
        to,
        revenue: Vec::new(),
        expenses: Vec::new(),
        total_revenue: Decimal::ZERO,
        total_expenses: Decimal::ZERO,
        net_income: Decimal::ZERO,
    };
    for account in &accounts {
        let (debit, credit) = sums.get(&account.id).copied().unwrap_or_default();
        let line = |amount| StatementLine {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            amount,
        };
        match account.kind {
            AccountKind::Revenue => {
                let amount = credit - debit;
                report.total_revenue += amount;
                report.revenue.push(line(amount));
            }
            AccountKind::Expense => {
                let amount = debit - credit;
                report.total_expenses += amount;
                report.expenses.push(line(amount));
            }
            _ => {}
        }
    }
    report.net_income = report.total_revenue - report.total_expenses;
    Ok(report)
}

/// Balance sheet as of a date: opening balance plus net activity through the
/// date for every Asset/Liability/Equity account, with retained earnings
/// derived from the fiscal year's profit and loss.
pub fn balance_sheet<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    as_of: NaiveDate,
) -> LedgerResult<BalanceSheetReport> {
    let accounts = store.accounts(
        tenant_id,
        &AccountFilter {
            kind: None,
            include_inactive: true,
        },
    )?;
    let rows = store.ledger_rows(
        tenant_id,
        &LedgerQuery {
            account_id: None,
            from: None,
            to: Some(as_of),
        },
    )?;

    let kinds: HashMap<AccountId, AccountKind> =
        accounts.iter().map(|a| (a.id, a.kind)).collect();
    let mut nets: HashMap<AccountId, Decimal> = HashMap::new();
    for row in &rows {
        let Some(kind) = kinds.get(&row.account_id) else {
            continue;
        };
        *nets.entry(row.account_id).or_default() += signed_delta(*kind, row.debit, row.credit);
    }

    let mut report = BalanceSheetReport {
        as_of,
        assets: Vec::new(),
        liabilities: Vec::new(),
        equity: Vec::new(),
        total_assets: Decimal::ZERO,
        total_liabilities: Decimal::ZERO,
        total_equity: Decimal::ZERO,
        retained_earnings: Decimal::ZERO,
        is_balanced: false,
    };
    for account in &accounts {
        let balance =
            account.opening_balance + nets.get(&account.id).copied().unwrap_or_default();
        let line = StatementLine {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            amount: balance,
        };
        match account.kind {
            AccountKind::Asset => {
                report.total_assets += balance;
                report.assets.push(line);
            }
            AccountKind::Liability => {
                report.total_liabilities += balance;
                report.liabilities.push(line);
            }
            AccountKind::Equity => {
                report.total_equity += balance;
                report.equity.push(line);
            }
            AccountKind::Revenue | AccountKind::Expense => {}
        }
    }

    let fiscal_start = NaiveDate::from_ymd_opt(as_of.year(), 1, 1).unwrap_or(as_of);
    let pnl = profit_and_loss(store, tenant_id, Some(fiscal_start), Some(as_of))?;
    report.retained_earnings = pnl.net_income;
    report.is_balanced = money::within_tolerance(
        report.total_assets,
        report.total_liabilities + report.total_equity + report.retained_earnings,
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balances_land_on_the_normal_side() {
        assert_eq!(split_normal(AccountKind::Asset, dec!(100)), (dec!(100), dec!(0)));
        assert_eq!(split_normal(AccountKind::Revenue, dec!(100)), (dec!(0), dec!(100)));
    }

    #[test]
    fn negative_balances_flip_to_the_opposite_side() {
        assert_eq!(split_normal(AccountKind::Asset, dec!(-25)), (dec!(0), dec!(25)));
        assert_eq!(split_normal(AccountKind::Liability, dec!(-25)), (dec!(25), dec!(0)));
    }
}
