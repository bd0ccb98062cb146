//! Yodelr error types
//!
//! Defines all errors that can occur in the index and post store.

use crate::storage::types::PostHandle;
use thiserror::Error;

/// Errors that can occur while mutating or querying the index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YodelrError {
    /// The operation requires a registered user
    #[error("(ERR=100) Unknown user: {0}")]
    UnknownUser(String),

    /// Post handle is out of range or has been tombstoned
    #[error("Post not found: {0}")]
    PostNotFound(PostHandle),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl YodelrError {
    pub const UNKNOWN_USER: u32 = 100;
    pub const POST_NOT_FOUND: u32 = 200;
    pub const LOCK: u32 = 500;

    /// Stable numeric code for callers that surface errors to their own users
    pub fn code(&self) -> u32 {
        match self {
            YodelrError::UnknownUser(_) => Self::UNKNOWN_USER,
            YodelrError::PostNotFound(_) => Self::POST_NOT_FOUND,
            YodelrError::Lock(_) => Self::LOCK,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for YodelrError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        YodelrError::Lock(err.to_string())
    }
}

/// Result type alias for index operations
pub type YodelrResult<T> = Result<T, YodelrError>;
