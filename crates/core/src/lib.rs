//! `openbooks-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers and the unified error taxonomy of the ledger
//! engine.

pub mod error;
pub mod id;

pub use error::{ErrorClass, LedgerError, LedgerResult};
pub use id::{AccountId, JournalEntryId, JournalLineId, TenantId, UserId};
