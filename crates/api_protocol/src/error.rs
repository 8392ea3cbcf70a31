//! Error codes and the error body returned to clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes carried in the `error.code` field of failed responses.
pub mod error_codes {
    /// A team with this name already exists.
    pub const TEAM_EXISTS: &str = "TEAM_EXISTS";
    /// A pull request with this ID already exists.
    pub const PR_EXISTS: &str = "PR_EXISTS";
    /// The pull request is merged and can no longer change.
    pub const PR_MERGED: &str = "PR_MERGED";
    /// The user is not a reviewer of the pull request.
    pub const NOT_ASSIGNED: &str = "NOT_ASSIGNED";
    /// No active teammate is available as a replacement reviewer.
    pub const NO_CANDIDATE: &str = "NO_CANDIDATE";
    /// The referenced team, user or pull request does not exist.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// The request body or query is malformed.
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    /// Anything else.
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// One of [`error_codes`].
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

impl ErrorResponse {
    /// Creates a new error body.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// A request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Creates an error for a missing required field.
    pub fn required(field: &str) -> Self {
        Self(format!("{field} is required"))
    }
}
