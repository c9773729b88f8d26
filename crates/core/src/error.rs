//! Core Error Types
//!
//! Defines the foundational error types used across the Course Assistant
//! workspace. They depend only on thiserror, serde_json and std, so
//! knowledge store backends can depend on this crate cheaply.
//!
//! The application crate adds configuration, I/O and orchestration
//! variants on top of these.

use thiserror::Error;

/// Core error type for the Course Assistant workspace.
///
/// Knowledge store implementations and retrieval tools report failures
/// through this type. The tool dispatcher turns any of these into an
/// error-flagged tool result, so none of them ever reach the caller of a
/// query directly.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Knowledge store backend failures (vector search, catalog lookup)
    #[error("Store error: {0}")]
    Store(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
