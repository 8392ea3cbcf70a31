//! Wire type definitions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use entities::{PullRequestShort, PullRequestStatus, Team, TeamMember, User, UserActivity};

/// Formats a timestamp as RFC 3339 UTC with second precision.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Pull request as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
}

impl From<entities::PullRequest> for PullRequest {
    fn from(pr: entities::PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers,
            created_at: pr.created_at.map(format_timestamp),
            merged_at: pr.merged_at.map(format_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamp_has_second_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(format_timestamp(ts), "2024-01-02T15:04:05Z");
    }

    #[test]
    fn test_pull_request_conversion_skips_missing_merge_time() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let pr = PullRequest::from(entities::PullRequest {
            pull_request_id: "pr-1".to_string(),
            pull_request_name: "feat".to_string(),
            author_id: "a".to_string(),
            status: PullRequestStatus::Open,
            assigned_reviewers: vec!["b".to_string()],
            created_at: Some(created),
            merged_at: None,
        });

        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["created_at"], "2024-01-02T15:04:05Z");
        assert!(json.get("merged_at").is_none());
    }
}
