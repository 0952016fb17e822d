//! Well-known account codes the adapters post against.

use openbooks_accounting::{Account, AccountKind, Ledger, LedgerStore, NewAccount};
use openbooks_core::{LedgerError, LedgerResult, TenantId};

pub const CASH: &str = "1000";
pub const ACCOUNTS_RECEIVABLE: &str = "1200";
pub const ACCOUNTS_PAYABLE: &str = "2000";
pub const TAX_PAYABLE: &str = "2100";
pub const SALES_REVENUE: &str = "4000";
pub const OPERATING_EXPENSE: &str = "5000";

const WELL_KNOWN: [(&str, &str, AccountKind); 6] = [
    (CASH, "Cash", AccountKind::Asset),
    (ACCOUNTS_RECEIVABLE, "Accounts Receivable", AccountKind::Asset),
    (ACCOUNTS_PAYABLE, "Accounts Payable", AccountKind::Liability),
    (TAX_PAYABLE, "Tax Payable", AccountKind::Liability),
    (SALES_REVENUE, "Sales Revenue", AccountKind::Revenue),
    (OPERATING_EXPENSE, "Operating Expense", AccountKind::Expense),
];

/// Create any missing well-known accounts for the tenant.
///
/// Explicit setup for provisioning and tests; the adapters themselves never
/// create accounts and fail loudly when one is missing.
pub fn bootstrap_chart<S: LedgerStore>(ledger: &Ledger<S>, tenant_id: TenantId) -> LedgerResult<()> {
    for (code, name, kind) in WELL_KNOWN {
        if ledger.store().account_by_code(tenant_id, code)?.is_none() {
            ledger.create_account(
                tenant_id,
                NewAccount {
                    code: code.to_string(),
                    name: name.to_string(),
                    kind,
                    parent_id: None,
                    opening_balance: None,
                    description: None,
                },
            )?;
        }
    }
    Ok(())
}

/// Resolve a fixed account by code, failing loudly when it is absent.
pub(crate) fn required_account<S: LedgerStore>(
    ledger: &Ledger<S>,
    tenant_id: TenantId,
    code: &str,
) -> LedgerResult<Account> {
    ledger
        .store()
        .account_by_code(tenant_id, code)?
        .ok_or_else(|| LedgerError::MissingAccount(code.to_string()))
}
