//! User-related entity definitions.

use serde::{Deserialize, Serialize};

/// A known user. Users are created implicitly when first added to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Current team. A user belongs to at most one team at a time.
    pub team_name: String,
    /// Only active users are eligible reviewers.
    pub is_active: bool,
}

/// Review statistics for a single reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    /// Reviewer identifier.
    pub user_id: String,
    /// Reviewer display name.
    pub username: String,
    /// Number of pull requests the user reviews.
    pub pull_requests: i64,
    /// How many of those are merged.
    pub merged_pr: i64,
    /// How many of those are still open.
    pub open_pr: i64,
}
