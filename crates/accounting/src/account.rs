//! Chart of accounts: account records and the registry operations.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_core::{AccountId, LedgerError, LedgerResult, TenantId};

use crate::money;
use crate::store::LedgerStore;

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    /// Whether the account's balance increases on the debit side.
    ///
    /// Asset and Expense accounts are debit-normal; Liability, Equity and
    /// Revenue accounts are credit-normal.
    pub fn debit_normal(self) -> bool {
        matches!(self, AccountKind::Asset | AccountKind::Expense)
    }
}

/// A ledger account in the tenant's chart of accounts.
///
/// `current_balance` is derived: it must equal `opening_balance` plus the
/// signed net of every posted ledger row, and is only mutated by the poster
/// and the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub parent_id: Option<AccountId>,
    pub active: bool,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub description: Option<String>,
}

/// Input for account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub parent_id: Option<AccountId>,
    /// Unset normalizes to zero; there is no other normalization.
    #[serde(default)]
    pub opening_balance: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial account update. `parent_id` is two-level so a parent can be
/// detached (`Some(None)`) as well as left untouched (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Option<AccountId>>,
    pub active: Option<bool>,
    pub opening_balance: Option<Decimal>,
}

/// Listing filter. The default selects active accounts of every kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFilter {
    pub kind: Option<AccountKind>,
    pub include_inactive: bool,
}

/// Create an account, enforcing code uniqueness and an acyclic hierarchy.
pub fn create_account<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    new: NewAccount,
) -> LedgerResult<Account> {
    let code = new.code.trim().to_string();
    if code.is_empty() {
        return Err(LedgerError::validation("account code must not be blank"));
    }
    if new.name.trim().is_empty() {
        return Err(LedgerError::validation("account name must not be blank"));
    }
    if store.account_by_code(tenant_id, &code)?.is_some() {
        return Err(LedgerError::DuplicateCode(code));
    }

    let id = AccountId::new();
    if let Some(parent_id) = new.parent_id {
        ensure_acyclic_parent(id, parent_id, |pid| Ok(store.account(tenant_id, pid)?))?;
    }

    let opening = money::round2(new.opening_balance.unwrap_or(Decimal::ZERO));
    let account = Account {
        id,
        tenant_id,
        code,
        name: new.name.trim().to_string(),
        kind: new.kind,
        parent_id: new.parent_id,
        active: true,
        opening_balance: opening,
        // No rows exist yet, so the derived balance is the opening balance.
        current_balance: opening,
        description: new.description,
    };
    store.insert_account(account.clone())?;
    Ok(account)
}

/// Apply a partial update.
///
/// Changing `opening_balance` does not rewrite ledger rows; `current_balance`
/// stays stale until a reconciliation pass runs (the service facade triggers a
/// scoped one).
pub fn update_account<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    id: AccountId,
    update: AccountUpdate,
) -> LedgerResult<Account> {
    let mut account = store
        .account(tenant_id, id)?
        .ok_or(LedgerError::AccountNotFound)?;

    if let Some(code) = update.code {
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(LedgerError::validation("account code must not be blank"));
        }
        if code != account.code && store.account_by_code(tenant_id, &code)?.is_some() {
            return Err(LedgerError::DuplicateCode(code));
        }
        account.code = code;
    }
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(LedgerError::validation("account name must not be blank"));
        }
        account.name = name.trim().to_string();
    }
    if let Some(description) = update.description {
        account.description = Some(description);
    }
    if let Some(parent) = update.parent_id {
        if let Some(parent_id) = parent {
            ensure_acyclic_parent(id, parent_id, |pid| Ok(store.account(tenant_id, pid)?))?;
        }
        account.parent_id = parent;
    }
    if let Some(active) = update.active {
        account.active = active;
    }
    if let Some(opening) = update.opening_balance {
        account.opening_balance = money::round2(opening);
    }

    store.update_account(account.clone())?;
    Ok(account)
}

/// List the tenant's accounts, ordered by code.
pub fn list_accounts<S: LedgerStore>(
    store: &S,
    tenant_id: TenantId,
    filter: &AccountFilter,
) -> LedgerResult<Vec<Account>> {
    Ok(store.accounts(tenant_id, filter)?)
}

/// Walk the parent chain upward from `parent_id` and reject any assignment
/// that would make `account_id` its own ancestor. Self-parenting is the
/// degenerate case. The visited set guards against walking a pre-existing
/// loop forever.
pub fn ensure_acyclic_parent<F>(
    account_id: AccountId,
    parent_id: AccountId,
    lookup: F,
) -> LedgerResult<()>
where
    F: Fn(AccountId) -> LedgerResult<Option<Account>>,
{
    let mut cursor = Some(parent_id);
    let mut seen: HashSet<AccountId> = HashSet::new();
    while let Some(current) = cursor {
        if current == account_id {
            return Err(LedgerError::HierarchyCycle(account_id.to_string()));
        }
        if !seen.insert(current) {
            return Err(LedgerError::HierarchyCycle(current.to_string()));
        }
        let parent = lookup(current)?.ok_or(LedgerError::AccountNotFound)?;
        cursor = parent.parent_id;
    }
    Ok(())
}
