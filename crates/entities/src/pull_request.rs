//! Pull request entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pull request status. `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    /// Open for review.
    #[default]
    Open,
    /// Merged.
    Merged,
}

impl PullRequestStatus {
    /// Converts the status to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "MERGED" => Some(Self::Merged),
            _ => None,
        }
    }

    /// Returns true once the pull request can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Merged)
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored pull request row, without its reviewer relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Client-supplied unique identifier.
    pub pull_request_id: String,
    /// Title.
    pub pull_request_name: String,
    /// Author user ID.
    pub author_id: String,
    /// Current status.
    pub status: PullRequestStatus,
    /// Assigned by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Assigned by the store on merge.
    pub merged_at: Option<DateTime<Utc>>,
}

/// A pull request together with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Client-supplied unique identifier.
    pub pull_request_id: String,
    /// Title.
    pub pull_request_name: String,
    /// Author user ID.
    pub author_id: String,
    /// Current status.
    pub status: PullRequestStatus,
    /// Assigned reviewer user IDs.
    pub assigned_reviewers: Vec<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Builds a pull request view from a stored record and its reviewers.
    pub fn from_record(record: PullRequestRecord, assigned_reviewers: Vec<String>) -> Self {
        Self {
            pull_request_id: record.pull_request_id,
            pull_request_name: record.pull_request_name,
            author_id: record.author_id,
            status: record.status,
            assigned_reviewers,
            created_at: Some(record.created_at),
            merged_at: record.merged_at,
        }
    }
}

/// Short form of a pull request, used when listing a reviewer's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    /// Pull request ID.
    pub pull_request_id: String,
    /// Title.
    pub pull_request_name: String,
    /// Author user ID.
    pub author_id: String,
    /// Current status.
    pub status: PullRequestStatus,
}
