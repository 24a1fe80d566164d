//! Domain error model.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure the auth and post domains can report. The HTTP layer maps
/// each variant onto a status code and a response body; infrastructure detail
/// carried by `Persistence` is for logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Client-fixable input defects, one message per field.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Unknown account or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    Authentication,

    /// A bearer token was missing, malformed, forged or expired.
    #[error("invalid token")]
    InvalidToken,

    /// Authenticated, but the role does not grant access.
    #[error("forbidden")]
    Authorization,

    /// The resource already exists (duplicate email, moniker, title...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A time-bound credential outlived its TTL.
    #[error("expired")]
    Expired,

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// The storage layer failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The server is misconfigured (missing key, claims not set...).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    pub fn validation(field: &'static str, msg: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, msg))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Failure reported by a storage adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// Anything else: connectivity, malformed rows, poisoned locks.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Backend(msg) => DomainError::Persistence(msg),
        }
    }
}
