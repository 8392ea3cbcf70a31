//! Server error types.

use api_protocol::{ErrorResponse, ValidationError, error_codes};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::AssignmentError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Malformed body or query, or a missing required field.
    #[error("{0}")]
    BadRequest(String),

    /// Team name already taken.
    #[error("team {0} already exists")]
    TeamExists(String),

    /// Team or user not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Pull request operation failed.
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the status and wire code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST),
            ServerError::TeamExists(_) => (StatusCode::BAD_REQUEST, error_codes::TEAM_EXISTS),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            ServerError::Assignment(err) => {
                let status = match err {
                    AssignmentError::NotFound(_) => StatusCode::NOT_FOUND,
                    AssignmentError::PrExists
                    | AssignmentError::PrMerged
                    | AssignmentError::NotAssigned
                    | AssignmentError::NoCandidate => StatusCode::CONFLICT,
                    AssignmentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        }
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        ServerError::BadRequest(err.0)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<review_store::ReviewStoreError> for ServerError {
    fn from(err: review_store::ReviewStoreError) -> Self {
        tracing::error!(error = %err, "Review store failure");
        ServerError::Internal("internal error".to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse::new(code, self.to_string());

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServerError::BadRequest("x".into()), 400, "BAD_REQUEST"),
            (ServerError::TeamExists("backend".into()), 400, "TEAM_EXISTS"),
            (ServerError::NotFound("user".into()), 404, "NOT_FOUND"),
            (AssignmentError::NotFound("pull request").into(), 404, "NOT_FOUND"),
            (AssignmentError::PrExists.into(), 409, "PR_EXISTS"),
            (AssignmentError::PrMerged.into(), 409, "PR_MERGED"),
            (AssignmentError::NotAssigned.into(), 409, "NOT_ASSIGNED"),
            (AssignmentError::NoCandidate.into(), 409, "NO_CANDIDATE"),
            (AssignmentError::Internal("boom").into(), 500, "INTERNAL_ERROR"),
            (ServerError::Internal("boom".into()), 500, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            let (actual_status, actual_code) = err.status_and_code();
            assert_eq!(actual_status.as_u16(), status, "{err:?}");
            assert_eq!(actual_code, code);
        }
    }

    #[test]
    fn test_store_errors_do_not_leak() {
        let err: ServerError =
            review_store::ReviewStoreError::Corrupt("bad status 'X' in row".into()).into();
        assert_eq!(err.to_string(), "internal error");
    }
}
