//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Display strings of the account variants are shown to the user verbatim.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Account already exists. Please log in.")]
    AccountExists,

    #[error("Account not found. Please sign up first.")]
    AccountNotFound,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Advice error: {0}")]
    Advice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an advice provider error
    pub fn advice(msg: impl Into<String>) -> Self {
        Self::Advice(msg.into())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_messages_are_user_facing() {
        assert_eq!(
            Error::AccountNotFound.to_string(),
            "Account not found. Please sign up first."
        );
        assert_eq!(
            Error::AccountExists.to_string(),
            "Account already exists. Please log in."
        );
        assert_eq!(
            Error::validation("Username is required.").to_string(),
            "Username is required."
        );
    }

    #[test]
    fn test_io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
