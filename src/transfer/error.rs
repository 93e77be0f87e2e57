//! Transfer Error Types
//!
//! The typed errors returned to callers of the ledger. Codes are stable and
//! suitable for any outer transport.

use thiserror::Error;

use crate::core_types::{AccountId, RecordId};
use crate::money::MoneyError;
use crate::store::StoreError;

/// Transfer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Input Errors (no transaction opened) ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Source and destination account cannot be the same")]
    SameAccount,

    // === Lookup Errors (no transaction opened) ===
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(RecordId),

    #[error("Account already exists: {0}")]
    AccountExists(AccountId),

    // === Business Rule Errors (no transaction opened) ===
    #[error("Account balance is less than transfer amount")]
    InsufficientFunds,

    #[error("Account balance is below the minimum allowed balance")]
    BelowMinimumBalance,

    // === Concurrency Errors (transaction rolled back, retryable) ===
    #[error("Account {0} was modified concurrently, retry the transfer")]
    ConcurrentModification(AccountId),

    // === Infrastructure Errors ===
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::AccountExists(_) => "ACCOUNT_EXISTS",
            TransferError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            TransferError::BelowMinimumBalance => "BELOW_MINIMUM_BALANCE",
            TransferError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            TransferError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount(_) | TransferError::SameAccount => 400,
            TransferError::AccountNotFound(_) | TransferError::TransferNotFound(_) => 404,
            TransferError::AccountExists(_) | TransferError::ConcurrentModification(_) => 409,
            TransferError::InsufficientFunds | TransferError::BelowMinimumBalance => 422,
            TransferError::StoreUnavailable(_) => 503,
        }
    }

    /// Whether the caller may retry the same request from scratch
    ///
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::ConcurrentModification(_))
    }
}

impl From<MoneyError> for TransferError {
    fn from(e: MoneyError) -> Self {
        TransferError::InvalidAmount(e.to_string())
    }
}

impl From<StoreError> for TransferError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountNotFound(id) => TransferError::AccountNotFound(id),
            StoreError::RecordNotFound(id) => TransferError::TransferNotFound(id),
            StoreError::Conflict(id) => TransferError::AccountExists(id),
            StoreError::VersionConflict { id, .. } => TransferError::ConcurrentModification(id),
            StoreError::InvalidValue(msg) => TransferError::InvalidAmount(msg),
            StoreError::Database(msg) | StoreError::Unavailable(msg) => {
                TransferError::StoreUnavailable(msg)
            }
        }
    }
}
