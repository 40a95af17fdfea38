use thiserror::Error;

use crate::domain::{TransactionId, ValidationError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// Whether the request itself was at fault (as opposed to the storage).
    pub fn is_user_error(&self) -> bool {
        matches!(self, LedgerError::Validation(_) | LedgerError::NotFound(_))
    }
}
