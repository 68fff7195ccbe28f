//! Error types module
//!
//! Domain errors are unified under the [`AppError`] enum. Repositories and
//! services return `Result<T, AppError>`; the API layer maps variants onto
//! HTTP statuses.

use crate::models::ConversionStatus;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Illegal conversion transition: {from} -> {to}")]
    IllegalTransition {
        from: ConversionStatus,
        to: ConversionStatus,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for domain operations
pub type AppResult<T> = Result<T, AppError>;
