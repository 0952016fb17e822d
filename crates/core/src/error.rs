//! Domain error model.
//!
//! One enum carries every failure kind the engine can surface, so callers can
//! match on a machine-checkable variant instead of parsing messages. Keep this
//! focused on deterministic business failures plus a single storage variant;
//! storage adapters describe their own failures and convert in.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the engine.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Coarse classification of a [`LedgerError`].
///
/// Validation errors are recoverable by correcting input; state errors reject
/// an operation against the current lifecycle/state without mutating anything;
/// storage errors mean the backing store could not commit and the whole
/// operation rolled back.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    State,
    Storage,
}

/// Engine-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A value failed validation (e.g. blank account code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A journal entry needs at least two lines.
    #[error("journal entry requires at least two lines")]
    InsufficientLines,

    /// A line carried a negative debit or credit amount.
    #[error("line {line}: debit and credit amounts must not be negative")]
    NegativeAmount { line: usize },

    /// A line carried both a debit and a credit.
    #[error("line {line}: a line cannot carry both a debit and a credit")]
    AmbiguousLine { line: usize },

    /// A line carried neither a debit nor a credit.
    #[error("line {line}: a line must carry either a debit or a credit")]
    EmptyLine { line: usize },

    /// Total debits and credits differ by more than the tolerance.
    #[error("entry is unbalanced: debits {debits:.2} do not equal credits {credits:.2}")]
    UnbalancedEntry { debits: Decimal, credits: Decimal },

    /// An account code is already taken within the tenant.
    #[error("account code '{0}' is already in use")]
    DuplicateCode(String),

    /// A parent assignment would close a cycle in the account hierarchy.
    #[error("account hierarchy cycle through account '{0}'")]
    HierarchyCycle(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced account does not exist for the tenant.
    #[error("account not found")]
    AccountNotFound,

    /// A referenced journal entry does not exist for the tenant.
    #[error("journal entry not found")]
    EntryNotFound,

    /// A posting adapter could not locate one of its fixed accounts.
    #[error("required account '{0}' is not configured")]
    MissingAccount(String),

    /// The operation is not legal in the entity's current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The backing store failed; nothing was persisted.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_)
            | Self::InsufficientLines
            | Self::NegativeAmount { .. }
            | Self::AmbiguousLine { .. }
            | Self::EmptyLine { .. }
            | Self::UnbalancedEntry { .. }
            | Self::DuplicateCode(_)
            | Self::HierarchyCycle(_)
            | Self::InvalidId(_) => ErrorClass::Validation,
            Self::AccountNotFound
            | Self::EntryNotFound
            | Self::MissingAccount(_)
            | Self::InvalidState(_) => ErrorClass::State,
            Self::Storage(_) => ErrorClass::Storage,
        }
    }
}
