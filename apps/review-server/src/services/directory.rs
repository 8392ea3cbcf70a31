//! Team and user directory operations.

use entities::{PullRequestShort, Team, User, UserActivity};
use review_store::ReviewStore;

use crate::error::{ServerError, ServerResult};

/// Creates a team and attaches its members. Returns the team as submitted.
pub async fn add_team<S: ReviewStore>(store: &S, team: Team) -> ServerResult<Team> {
    match store.add_team(&team).await {
        Ok(()) => {
            tracing::info!(
                team = %team.team_name,
                members = team.members.len(),
                "Team created"
            );
            Ok(team)
        }
        Err(err) if err.is_already_exists("Team") => {
            Err(ServerError::TeamExists(team.team_name))
        }
        Err(err) => Err(err.into()),
    }
}

/// Gets a team with its current members.
pub async fn get_team<S: ReviewStore>(store: &S, team_name: &str) -> ServerResult<Team> {
    store
        .get_team(team_name)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("team {team_name}")))
}

/// Sets the activity flag of a user.
pub async fn set_is_active<S: ReviewStore>(
    store: &S,
    user_id: &str,
    is_active: bool,
) -> ServerResult<User> {
    let user = store
        .set_user_active(user_id, is_active)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {user_id}")))?;

    tracing::info!(user_id, is_active, "User activity flag updated");
    Ok(user)
}

/// Lists the pull requests a user reviews.
pub async fn get_review<S: ReviewStore>(
    store: &S,
    user_id: &str,
) -> ServerResult<Vec<PullRequestShort>> {
    if store.get_user(user_id).await?.is_none() {
        return Err(ServerError::NotFound(format!("user {user_id}")));
    }
    Ok(store.list_reviews(user_id).await?)
}

/// Review statistics per reviewer.
pub async fn get_activity<S: ReviewStore>(store: &S) -> ServerResult<Vec<UserActivity>> {
    Ok(store.user_activity().await?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use entities::{PullRequestStatus, TeamMember};
    use review_store::MemoryReviewStore;

    use super::*;
    use crate::services::AssignmentEngine;

    fn backend() -> Team {
        Team::new("backend")
            .with_member(TeamMember::new("a", "Alice"))
            .with_member(TeamMember::new("b", "Bob"))
    }

    #[tokio::test]
    async fn test_add_team_twice() {
        let store = MemoryReviewStore::new();

        let team = add_team(&store, backend()).await.unwrap();
        assert_eq!(team, backend());

        let err = add_team(&store, backend()).await.unwrap_err();
        assert!(matches!(err, ServerError::TeamExists(ref name) if name == "backend"));
    }

    #[tokio::test]
    async fn test_get_team_and_unknown_team() {
        let store = MemoryReviewStore::new();
        add_team(&store, backend()).await.unwrap();

        let team = get_team(&store, "backend").await.unwrap();
        assert_eq!(team.members.len(), 2);

        let err = get_team(&store, "frontend").await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_is_active() {
        let store = MemoryReviewStore::new();
        add_team(&store, backend()).await.unwrap();

        let user = set_is_active(&store, "b", false).await.unwrap();
        assert_eq!(user.team_name, "backend");
        assert_eq!(user.username, "Bob");
        assert!(!user.is_active);

        let err = set_is_active(&store, "ghost", true).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_review_lists_assigned_pull_requests() {
        let store = MemoryReviewStore::new();
        add_team(&store, backend()).await.unwrap();
        AssignmentEngine::new(&store, Duration::from_secs(5))
            .create("pr-1", "feat", "a")
            .await
            .unwrap();

        let reviews = get_review(&store, "b").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].pull_request_id, "pr-1");
        assert_eq!(reviews[0].status, PullRequestStatus::Open);

        assert!(get_review(&store, "a").await.unwrap().is_empty());
        assert!(matches!(
            get_review(&store, "ghost").await.unwrap_err(),
            ServerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_get_activity() {
        let store = MemoryReviewStore::new();
        add_team(&store, backend()).await.unwrap();
        let engine = AssignmentEngine::new(&store, Duration::from_secs(5));
        engine.create("pr-1", "feat", "a").await.unwrap();
        engine.create("pr-2", "fix", "a").await.unwrap();
        engine.merge("pr-1", None).await.unwrap();

        let activity = get_activity(&store).await.unwrap();
        let bob = activity.iter().find(|a| a.user_id == "b").unwrap();
        assert_eq!(bob.pull_requests, 2);
        assert_eq!(bob.merged_pr, 1);
        assert_eq!(bob.open_pr, 1);
    }
}
