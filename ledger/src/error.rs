//! Error handling for the stock batch ledger
//!
//! A closed taxonomy returned as typed results to the immediate caller.
//! The UI boundary maps each kind to its own message via [`LedgerError::code`].

use thiserror::Error;

use crate::store::StoreError;

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    // Validation errors
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid correction: {0}")]
    InvalidCorrection(String),

    // Business logic errors
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Deletion not allowed: {0}")]
    DeletionNotAllowed(String),

    /// Transaction conflict that survived the bounded retry loop
    #[error("Concurrent modification detected")]
    ConcurrentModification,

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    /// Stable machine-readable code, one per taxonomy entry
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidQuantity(_) => "INVALID_QUANTITY",
            LedgerError::InvalidCorrection(_) => "INVALID_CORRECTION",
            LedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::DeletionNotAllowed(_) => "DELETION_NOT_ALLOWED",
            LedgerError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            LedgerError::Store(_) => "STORE_ERROR",
            LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
