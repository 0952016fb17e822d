//! Balance reconciliation: replay ledger history and correct drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{AccountId, LedgerError, LedgerResult, TenantId};

use crate::account::{Account, AccountFilter};
use crate::ledger::signed_delta;
use crate::money;
use crate::store::{LedgerQuery, LedgerStore};

/// An account whose stored current balance drifted from the replayed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDiscrepancy {
    pub account_id: AccountId,
    pub code: String,
    pub name: String,
    pub previous_balance: Decimal,
    pub recalculated_balance: Decimal,
    /// Signed `recalculated - previous`.
    pub difference: Decimal,
}

/// A per-account failure captured without aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationFailure {
    pub account_id: AccountId,
    pub code: String,
    pub message: String,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationSummary {
    pub accounts_processed: usize,
    pub accounts_updated: usize,
    pub rows_corrected: usize,
    pub discrepancies: Vec<BalanceDiscrepancy>,
    pub errors: Vec<RecalculationFailure>,
}

struct AccountOutcome {
    corrections: usize,
    changed: bool,
    discrepancy: Option<BalanceDiscrepancy>,
}

/// Replay every ledger row of the selected accounts (one account, or all
/// active accounts) from the opening balance, rewriting drifted running
/// balances and current balances.
///
/// Fail-soft at the batch level: a failure on one account is collected into
/// the summary and the remaining accounts still run. Each account's
/// correction commits on its own, so an interrupted run keeps everything
/// already corrected. Idempotent: a second consecutive run reports no
/// discrepancies and corrects nothing.
pub fn recalculate<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    account_id: Option<AccountId>,
) -> LedgerResult<RecalculationSummary> {
    let targets: Vec<Account> = match account_id {
        Some(id) => vec![
            store
                .account(tenant_id, id)?
                .ok_or(LedgerError::AccountNotFound)?,
        ],
        None => store.accounts(tenant_id, &AccountFilter::default())?,
    };

    let mut summary = RecalculationSummary::default();
    for account in targets {
        summary.accounts_processed += 1;
        match recalculate_account(store, tenant_id, &account) {
            Ok(outcome) => {
                summary.rows_corrected += outcome.corrections;
                if outcome.changed {
                    summary.accounts_updated += 1;
                }
                if let Some(discrepancy) = outcome.discrepancy {
                    summary.discrepancies.push(discrepancy);
                }
            }
            Err(err) => summary.errors.push(RecalculationFailure {
                account_id: account.id,
                code: account.code.clone(),
                message: err.to_string(),
            }),
        }
    }
    Ok(summary)
}

fn recalculate_account<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    account: &Account,
) -> LedgerResult<AccountOutcome> {
    let query = LedgerQuery {
        account_id: Some(account.id),
        ..LedgerQuery::default()
    };
    let rows = store.ledger_rows(tenant_id, &query)?;

    let mut running = account.opening_balance;
    let mut corrections: Vec<(u64, Decimal)> = Vec::new();
    for row in &rows {
        running = money::round2(running + signed_delta(account.kind, row.debit, row.credit));
        if !money::within_tolerance(row.running_balance, running) {
            corrections.push((row.sequence, running));
        }
    }

    let discrepancy = if money::within_tolerance(account.current_balance, running) {
        None
    } else {
        Some(BalanceDiscrepancy {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            previous_balance: account.current_balance,
            recalculated_balance: running,
            difference: running - account.current_balance,
        })
    };

    let changed = !corrections.is_empty() || discrepancy.is_some();
    if changed {
        let new_balance = discrepancy.as_ref().map(|_| running);
        store.apply_reconciliation(tenant_id, account.id, &corrections, new_balance)?;
    }
    Ok(AccountOutcome {
        corrections: corrections.len(),
        changed,
        discrepancy,
    })
}
