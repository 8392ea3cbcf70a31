//! Request types.
//!
//! Fields default to empty values on decode so that a missing field is
//! reported by `validate` with the same error as an empty one.

use serde::{Deserialize, Serialize};

use crate::{PullRequestStatus, Team, TeamMember, ValidationError};

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// ============================================================================
// Team Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAddRequest {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamAddRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("team_name", &self.team_name)?;
        if self.members.is_empty() {
            return Err(ValidationError::required("members"));
        }
        for member in &self.members {
            require("members.user_id", &member.user_id)?;
        }
        Ok(())
    }

    pub fn into_team(self) -> Team {
        Team {
            team_name: self.team_name,
            members: self.members,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamGetQuery {
    pub team_name: String,
}

impl TeamGetQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("team_name", &self.team_name)
    }
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

impl SetIsActiveRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("user_id", &self.user_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetReviewQuery {
    pub user_id: String,
}

impl GetReviewQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("user_id", &self.user_id)
    }
}

// ============================================================================
// Pull Request Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

impl CreatePullRequestRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("pull_request_id", &self.pull_request_id)?;
        require("pull_request_name", &self.pull_request_name)?;
        require("author_id", &self.author_id)
    }
}

/// Merge request.
///
/// `status` is the caller's last known status of the pull request. When it is
/// `MERGED` the server returns the stored record without writing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
    pub status: Option<PullRequestStatus>,
}

impl MergePullRequestRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("pull_request_id", &self.pull_request_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassignPullRequestRequest {
    pub pull_request_id: String,
    #[serde(alias = "old_reviewer_id")]
    pub old_user_id: String,
}

impl ReassignPullRequestRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("pull_request_id", &self.pull_request_id)?;
        require("old_user_id", &self.old_user_id)
    }
}
