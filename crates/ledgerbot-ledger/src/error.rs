//! Error types for the ledgerbot-ledger crate.
//!
//! Only one thing can actually fail here: the tabular store.  A lookup that
//! finds no matching row is a normal outcome and is reported through the
//! operation result types, never as an error.

use thiserror::Error;

/// Alias for `Result<T, LedgerError>`.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The underlying range read or write failed (network, auth, quota).
    ///
    /// The store applies a single-range update atomically, so a failed
    /// write leaves the sheet in its pre-call state.
    #[error("tabular store unavailable: {0}")]
    StoreUnavailable(#[from] ledgerbot_store::StoreError),
}
