//! Domain errors for the recommendation core.

use thiserror::Error;

/// Domain-level errors that can occur in the recommendation core.
///
/// Scoring and assembly never fail; these errors only surface from parsing
/// caller input and from the persistence boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown learning domain: {0}")]
    UnknownDomain(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
