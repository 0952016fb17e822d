//! Invoice posting: debit receivable, credit revenue and tax payable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use openbooks_accounting::{
    EntryReference, JournalEntry, Ledger, LedgerStore, LineInput, NewJournalEntry,
};
use openbooks_core::{LedgerResult, TenantId, UserId};

use crate::chart::{self, required_account};

pub const INVOICE_REFERENCE: &str = "invoice";

/// The slice of an issued invoice the ledger cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer: String,
    pub net_amount: Decimal,
    pub tax_amount: Decimal,
    pub issued_on: NaiveDate,
}

/// Post the accounting effect of an issued invoice: debit Accounts
/// Receivable for the gross amount, credit Sales Revenue for the net and Tax
/// Payable for the tax (omitted when zero).
///
/// Idempotent on the invoice id: a retried call returns the entry created by
/// the first one and writes nothing.
pub fn post_from_invoice<S: LedgerStore>(
    ledger: &Ledger<S>,
    tenant_id: TenantId,
    invoice: &Invoice,
    actor: UserId,
) -> LedgerResult<JournalEntry> {
    if let Some(existing) =
        ledger.find_entry_by_reference(tenant_id, INVOICE_REFERENCE, &invoice.id)?
    {
        tracing::debug!(
            "invoice {} already posted as entry {}",
            invoice.id,
            existing.number
        );
        return Ok(existing);
    }

    let receivable = required_account(ledger, tenant_id, chart::ACCOUNTS_RECEIVABLE)?;
    let sales = required_account(ledger, tenant_id, chart::SALES_REVENUE)?;

    let mut lines = vec![
        LineInput::debit(receivable.id, invoice.net_amount + invoice.tax_amount),
        LineInput::credit(sales.id, invoice.net_amount),
    ];
    if invoice.tax_amount > Decimal::ZERO {
        let tax = required_account(ledger, tenant_id, chart::TAX_PAYABLE)?;
        lines.push(LineInput::credit(tax.id, invoice.tax_amount));
    }

    let entry = ledger.create_entry(
        tenant_id,
        NewJournalEntry {
            entry_date: invoice.issued_on,
            description: format!("Invoice {} to {}", invoice.id, invoice.customer),
            lines,
            reference: Some(EntryReference::new(INVOICE_REFERENCE, invoice.id.clone())),
            created_by: actor,
        },
    )?;
    ledger.post_entry(tenant_id, entry.id, actor)
}
