//! Response types.

use serde::{Deserialize, Serialize};

use crate::{PullRequest, PullRequestShort, Team, User, UserActivity};

// ============================================================================
// Team Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAddResponse {
    pub team: Team,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIsActiveResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReviewResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetActivityResponse {
    pub activity: Vec<UserActivity>,
}

// ============================================================================
// Pull Request Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignPullRequestResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}
