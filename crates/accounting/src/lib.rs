//! Accounting engine (double-entry ledger).
//!
//! Pure domain + repository boundary only: no IO beyond the [`store::LedgerStore`]
//! trait, no HTTP, no persistence concerns. The [`service::Ledger`] facade is
//! the in-process boundary the surrounding application consumes.

pub mod account;
pub mod entry;
pub mod journal;
pub mod ledger;
pub mod money;
pub mod numbering;
pub mod reconcile;
pub mod service;
pub mod statements;
pub mod store;
pub mod validator;

pub use account::{Account, AccountFilter, AccountKind, AccountUpdate, NewAccount};
pub use entry::{
    EntryReference, EntryStatus, JournalEntry, JournalEntryLine, LineInput, NewJournalEntry,
};
pub use ledger::{GeneralLedgerRecord, PendingLedgerRow, Posting, signed_delta};
pub use reconcile::{BalanceDiscrepancy, RecalculationFailure, RecalculationSummary};
pub use service::{AccountDiagnostics, DiagnosticRow, Ledger, LedgerRowView};
pub use statements::{
    BalanceSheetReport, ProfitAndLossReport, StatementLine, TrialBalanceReport, TrialBalanceRow,
};
pub use store::{LedgerQuery, LedgerStore, StoreError, StoreResult};
