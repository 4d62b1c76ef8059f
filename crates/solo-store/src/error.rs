//! Storage error types.

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid identifier format: {0}")]
    InvalidId(String),

    #[error("Duplicate bid by {email} on job {job_id}")]
    DuplicateBid { email: String, job_id: String },

    #[error("Update contains no fields")]
    EmptyUpdate,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    Serialize(#[from] mongodb::bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    Deserialize(#[from] mongodb::bson::de::Error),
}

impl StoreError {
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn duplicate_bid(email: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self::DuplicateBid {
            email: email.into(),
            job_id: job_id.into(),
        }
    }

    /// True if the caller sent something malformed rather than hitting a
    /// storage failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidId(_) | StoreError::EmptyUpdate | StoreError::DuplicateBid { .. }
        )
    }
}

/// True if a driver error is a unique index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(StoreError::invalid_id("nope").is_client_error());
        assert!(StoreError::EmptyUpdate.is_client_error());
        assert!(StoreError::duplicate_bid("a@b.c", "65a1b2c3d4e5f6a7b8c9d0e1").is_client_error());
        assert!(!StoreError::config("missing DB_USER").is_client_error());
    }

    #[test]
    fn test_duplicate_bid_message() {
        let err = StoreError::duplicate_bid("a@b.c", "65a1b2c3d4e5f6a7b8c9d0e1");
        assert_eq!(err.to_string(), "Duplicate bid by a@b.c on job 65a1b2c3d4e5f6a7b8c9d0e1");
    }
}
