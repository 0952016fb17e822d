//! Sale posting: debit cash, credit revenue and tax payable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_accounting::{
    EntryReference, JournalEntry, Ledger, LedgerStore, LineInput, NewJournalEntry,
};
use openbooks_core::{LedgerResult, TenantId, UserId};

use crate::chart::{self, required_account};

pub const SALE_REFERENCE: &str = "sale";

/// A completed over-the-counter sale, settled in cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Gross amount collected, tax included.
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub completed_on: NaiveDate,
}

/// Post the accounting effect of a completed sale: debit Cash for the gross
/// amount, credit Sales Revenue for the net and Tax Payable for the tax
/// (omitted when zero).
///
/// Idempotent on the sale id.
pub fn post_from_sale<S: LedgerStore>(
    ledger: &Ledger<S>,
    tenant_id: TenantId,
    sale: &Sale,
    actor: UserId,
) -> LedgerResult<JournalEntry> {
    if let Some(existing) = ledger.find_entry_by_reference(tenant_id, SALE_REFERENCE, &sale.id)? {
        tracing::debug!("sale {} already posted as entry {}", sale.id, existing.number);
        return Ok(existing);
    }

    let cash = required_account(ledger, tenant_id, chart::CASH)?;
    let sales = required_account(ledger, tenant_id, chart::SALES_REVENUE)?;

    let mut lines = vec![
        LineInput::debit(cash.id, sale.total_amount),
        LineInput::credit(sales.id, sale.total_amount - sale.tax_amount),
    ];
    if sale.tax_amount > Decimal::ZERO {
        let tax = required_account(ledger, tenant_id, chart::TAX_PAYABLE)?;
        lines.push(LineInput::credit(tax.id, sale.tax_amount));
    }

    let entry = ledger.create_entry(
        tenant_id,
        NewJournalEntry {
            entry_date: sale.completed_on,
            description: format!("Sale {}", sale.id),
            lines,
            reference: Some(EntryReference::new(SALE_REFERENCE, sale.id.clone())),
            created_by: actor,
        },
    )?;
    ledger.post_entry(tenant_id, entry.id, actor)
}
