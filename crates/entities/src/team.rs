//! Team entity definitions.

use serde::{Deserialize, Serialize};

/// A member entry of a team, as submitted on team add and returned on lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// User identifier.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Whether the user is eligible as a reviewer.
    pub is_active: bool,
}

impl TeamMember {
    /// Creates an active member.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Sets the activity flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A named group of users. Reviewers are always drawn from the author's team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name.
    pub team_name: String,
    /// Team members.
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Creates a team with no members.
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member.
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }
}
