// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A concurrent writer won; the transaction must be re-run from a fresh read
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Conflicts persisted past the retry budget
    #[error("Transient failure: {operation} gave up after {attempts} conflicting attempts")]
    Transient {
        operation: &'static str,
        attempts: u32,
    },
}

impl AppError {
    /// Worth retrying the whole transaction
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// Caller may try again later
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Conflict(_) | AppError::Transient { .. })
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String) or AppError::Conflict(String)
