//! Error types for external collaborators

use thiserror::Error;

/// Lead repository errors
///
/// Repository operations are network calls and may fail transiently.
/// This core reports failures and moves on; retry policy, if any, belongs
/// to the repository implementation.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Lead not found: {0}")]
    NotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Voice-call provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rejected call: {0}")]
    Rejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
