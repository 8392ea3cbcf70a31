//! Review store error types.

use thiserror::Error;

/// Errors that can occur during review store operations.
#[derive(Debug, Error)]
pub enum ReviewStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Duplicate entity.
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data that cannot be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl ReviewStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }

    /// Returns true if this is a duplicate of the given entity type.
    pub fn is_already_exists(&self, entity: &str) -> bool {
        matches!(self, Self::AlreadyExists { entity_type, .. } if *entity_type == entity)
    }

    /// Converts a database error, classifying unique violations as duplicates.
    pub(crate) fn from_insert(err: sqlx::Error, entity_type: &'static str, id: &str) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            Self::already_exists(entity_type, id)
        } else {
            Self::Database(err)
        }
    }
}

/// Result type for review store operations.
pub type ReviewStoreResult<T> = Result<T, ReviewStoreError>;
