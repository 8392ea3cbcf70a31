//! In-memory review store implementation for testing and local runs.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    PullRequest, PullRequestRecord, PullRequestShort, PullRequestStatus, Team, TeamMember, User,
    UserActivity,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{ReviewStore, ReviewStoreError, ReviewStoreResult, ReviewTransaction};

/// Everything the store holds.
#[derive(Debug, Default, Clone)]
struct MemoryState {
    teams: BTreeSet<String>,
    users: HashMap<String, User>,
    pull_requests: HashMap<String, PullRequestRecord>,
    /// Reviewer relation, keyed by pull request ID.
    reviewers: HashMap<String, Vec<String>>,
}

impl MemoryState {
    fn pull_request(&self, pull_request_id: &str) -> Option<PullRequest> {
        let record = self.pull_requests.get(pull_request_id)?.clone();
        let reviewers = self
            .reviewers
            .get(pull_request_id)
            .cloned()
            .unwrap_or_default();
        Some(PullRequest::from_record(record, reviewers))
    }
}

/// In-memory review store.
///
/// Transactions are serialized: a transaction holds the store lock from
/// `begin` until it is committed or dropped, and works on a copy of the state
/// that replaces the shared state only on commit.
#[derive(Debug, Default, Clone)]
pub struct MemoryReviewStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryReviewStore {
    /// Creates a new in-memory review store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Transaction over a [`MemoryReviewStore`].
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl ReviewTransaction for MemoryTransaction {
    async fn user_team(&mut self, user_id: &str) -> ReviewStoreResult<Option<String>> {
        Ok(self.working.users.get(user_id).map(|u| u.team_name.clone()))
    }

    async fn pull_request_exists(&mut self, pull_request_id: &str) -> ReviewStoreResult<bool> {
        Ok(self.working.pull_requests.contains_key(pull_request_id))
    }

    async fn select_active_teammates(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        exclude: &[String],
    ) -> ReviewStoreResult<Vec<String>> {
        let mut candidates: Vec<String> = self
            .working
            .users
            .values()
            .filter(|u| {
                u.team_name == team_name
                    && u.is_active
                    && u.user_id != exclude_user_id
                    && !exclude.contains(&u.user_id)
            })
            .map(|u| u.user_id.clone())
            .collect();
        candidates.sort();
        Ok(candidates)
    }

    async fn insert_pull_request(
        &mut self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
        status: PullRequestStatus,
    ) -> ReviewStoreResult<DateTime<Utc>> {
        if self.working.pull_requests.contains_key(pull_request_id) {
            return Err(ReviewStoreError::already_exists(
                "PullRequest",
                pull_request_id,
            ));
        }
        if !self.working.users.contains_key(author_id) {
            return Err(ReviewStoreError::not_found("User", author_id));
        }

        let created_at = Utc::now();
        self.working.pull_requests.insert(
            pull_request_id.to_string(),
            PullRequestRecord {
                pull_request_id: pull_request_id.to_string(),
                pull_request_name: pull_request_name.to_string(),
                author_id: author_id.to_string(),
                status,
                created_at,
                merged_at: None,
            },
        );
        Ok(created_at)
    }

    async fn set_reviewers(
        &mut self,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> ReviewStoreResult<()> {
        if !self.working.pull_requests.contains_key(pull_request_id) {
            return Err(ReviewStoreError::not_found("PullRequest", pull_request_id));
        }
        self.working
            .reviewers
            .insert(pull_request_id.to_string(), reviewers.to_vec());
        Ok(())
    }

    async fn fetch_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<Option<PullRequestRecord>> {
        Ok(self.working.pull_requests.get(pull_request_id).cloned())
    }

    async fn update_status_merged(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<(PullRequestStatus, DateTime<Utc>)> {
        let record = self
            .working
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| ReviewStoreError::not_found("PullRequest", pull_request_id))?;

        record.status = PullRequestStatus::Merged;
        let merged_at = *record.merged_at.get_or_insert_with(Utc::now);
        Ok((record.status, merged_at))
    }

    async fn is_reviewer_of(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> ReviewStoreResult<bool> {
        Ok(self
            .working
            .reviewers
            .get(pull_request_id)
            .is_some_and(|r| r.iter().any(|id| id == user_id)))
    }

    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_user_id: &str,
        new_user_id: &str,
    ) -> ReviewStoreResult<()> {
        let slot = self
            .working
            .reviewers
            .get_mut(pull_request_id)
            .and_then(|r| r.iter_mut().find(|id| id.as_str() == old_user_id))
            .ok_or_else(|| ReviewStoreError::not_found("Reviewer", old_user_id))?;
        *slot = new_user_id.to_string();
        Ok(())
    }

    async fn list_reviewers(&mut self, pull_request_id: &str) -> ReviewStoreResult<Vec<String>> {
        Ok(self
            .working
            .reviewers
            .get(pull_request_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(self: Box<Self>) -> ReviewStoreResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn begin(&self) -> ReviewStoreResult<Box<dyn ReviewTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn add_team(&self, team: &Team) -> ReviewStoreResult<()> {
        let mut state = self.state.lock().await;
        if state.teams.contains(&team.team_name) {
            return Err(ReviewStoreError::already_exists("Team", &team.team_name));
        }
        state.teams.insert(team.team_name.clone());

        for member in &team.members {
            state
                .users
                .entry(member.user_id.clone())
                .and_modify(|u| u.team_name = team.team_name.clone())
                .or_insert_with(|| User {
                    user_id: member.user_id.clone(),
                    username: member.username.clone(),
                    team_name: team.team_name.clone(),
                    is_active: member.is_active,
                });
        }
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> ReviewStoreResult<Option<Team>> {
        let state = self.state.lock().await;
        if !state.teams.contains(team_name) {
            return Ok(None);
        }

        let mut members: Vec<TeamMember> = state
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    async fn get_user(&self, user_id: &str) -> ReviewStoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewStoreResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(user_id).map(|u| {
            u.is_active = is_active;
            u.clone()
        }))
    }

    async fn list_reviews(&self, user_id: &str) -> ReviewStoreResult<Vec<PullRequestShort>> {
        let state = self.state.lock().await;
        let mut result: Vec<PullRequestShort> = state
            .reviewers
            .iter()
            .filter(|(_, reviewers)| reviewers.iter().any(|id| id == user_id))
            .filter_map(|(pr_id, _)| state.pull_requests.get(pr_id))
            .map(|pr| PullRequestShort {
                pull_request_id: pr.pull_request_id.clone(),
                pull_request_name: pr.pull_request_name.clone(),
                author_id: pr.author_id.clone(),
                status: pr.status,
            })
            .collect();
        result.sort_by(|a, b| a.pull_request_id.cmp(&b.pull_request_id));
        Ok(result)
    }

    async fn user_activity(&self) -> ReviewStoreResult<Vec<UserActivity>> {
        let state = self.state.lock().await;
        let mut counts: HashMap<&str, (i64, i64, i64)> = HashMap::new();

        for (pr_id, reviewers) in &state.reviewers {
            let Some(pr) = state.pull_requests.get(pr_id) else {
                continue;
            };
            for reviewer in reviewers {
                let entry = counts.entry(reviewer.as_str()).or_default();
                entry.0 += 1;
                match pr.status {
                    PullRequestStatus::Merged => entry.1 += 1,
                    PullRequestStatus::Open => entry.2 += 1,
                }
            }
        }

        let mut activity: Vec<UserActivity> = counts
            .into_iter()
            .filter_map(|(user_id, (total, merged, open))| {
                state.users.get(user_id).map(|u| UserActivity {
                    user_id: u.user_id.clone(),
                    username: u.username.clone(),
                    pull_requests: total,
                    merged_pr: merged,
                    open_pr: open,
                })
            })
            .collect();
        activity.sort_by(|a, b| {
            b.pull_requests
                .cmp(&a.pull_requests)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(activity)
    }

    async fn get_pull_request(
        &self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<Option<PullRequest>> {
        let state = self.state.lock().await;
        Ok(state.pull_request(pull_request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_team() -> Team {
        Team::new("backend")
            .with_member(TeamMember::new("a", "Alice"))
            .with_member(TeamMember::new("b", "Bob"))
            .with_member(TeamMember::new("d", "Dave").with_active(false))
    }

    #[tokio::test]
    async fn test_team_crud() {
        let store = MemoryReviewStore::new();

        store.add_team(&backend_team()).await.unwrap();

        let team = store.get_team("backend").await.unwrap().unwrap();
        assert_eq!(team.members.len(), 3);
        assert_eq!(team.members[0].user_id, "a");

        let err = store.add_team(&backend_team()).await.unwrap_err();
        assert!(err.is_already_exists("Team"));

        assert!(store.get_team("frontend").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_team_add_moves_existing_users() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        let frontend = Team::new("frontend")
            .with_member(TeamMember::new("b", "Robert").with_active(false))
            .with_member(TeamMember::new("e", "Eve"));
        store.add_team(&frontend).await.unwrap();

        let bob = store.get_user("b").await.unwrap().unwrap();
        assert_eq!(bob.team_name, "frontend");
        // Existing users keep their name and activity flag.
        assert_eq!(bob.username, "Bob");
        assert!(bob.is_active);

        let backend = store.get_team("backend").await.unwrap().unwrap();
        assert_eq!(backend.members.len(), 2);
    }

    #[tokio::test]
    async fn test_set_user_active() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        let user = store.set_user_active("a", false).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert_eq!(user.team_name, "backend");

        assert!(store.set_user_active("zzz", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_pull_request("pr-1", "feat", "a", PullRequestStatus::Open)
                .await
                .unwrap();
            assert!(tx.pull_request_exists("pr-1").await.unwrap());
        }

        assert!(store.get_pull_request("pr-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request("pr-1", "feat", "a", PullRequestStatus::Open)
            .await
            .unwrap();
        tx.set_reviewers("pr-1", &["b".to_string()]).await.unwrap();
        tx.commit().await.unwrap();

        let pr = store.get_pull_request("pr-1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b".to_string()]);
        assert_eq!(pr.status, PullRequestStatus::Open);

        let reviews = store.list_reviews("b").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].pull_request_id, "pr-1");
    }

    #[tokio::test]
    async fn test_select_active_teammates_filters() {
        let store = MemoryReviewStore::new();
        store
            .add_team(&backend_team().with_member(TeamMember::new("c", "Carol")))
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let candidates = tx
            .select_active_teammates("backend", "a", &["b".to_string()])
            .await
            .unwrap();
        assert_eq!(candidates, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_keeps_first_timestamp() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request("pr-1", "feat", "a", PullRequestStatus::Open)
            .await
            .unwrap();
        let (_, first) = tx.update_status_merged("pr-1").await.unwrap();
        let (status, second) = tx.update_status_merged("pr-1").await.unwrap();
        assert_eq!(status, PullRequestStatus::Merged);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_user_activity_counts() {
        let store = MemoryReviewStore::new();
        store.add_team(&backend_team()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        for id in ["pr-1", "pr-2"] {
            tx.insert_pull_request(id, "feat", "a", PullRequestStatus::Open)
                .await
                .unwrap();
            tx.set_reviewers(id, &["b".to_string()]).await.unwrap();
        }
        tx.update_status_merged("pr-2").await.unwrap();
        tx.commit().await.unwrap();

        let activity = store.user_activity().await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].user_id, "b");
        assert_eq!(activity[0].pull_requests, 2);
        assert_eq!(activity[0].merged_pr, 1);
        assert_eq!(activity[0].open_pr, 1);
    }
}
