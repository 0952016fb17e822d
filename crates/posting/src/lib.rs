//! Posting adapters: translate domain events (invoice issued, expense
//! recorded, sale completed) into balanced journal entries against fixed,
//! well-known account codes.
//!
//! Every adapter is idempotent on the domain record's
//! `(reference_type, reference_id)` pair: posting the same record twice
//! returns the entry created the first time.

pub mod chart;
pub mod expense;
pub mod invoice;
pub mod sale;

pub use chart::bootstrap_chart;
pub use expense::{Expense, post_from_expense};
pub use invoice::{Invoice, post_from_invoice};
pub use sale::{Sale, post_from_sale};
