//! Review store trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    PullRequest, PullRequestRecord, PullRequestShort, PullRequestStatus, Team, User, UserActivity,
};

use crate::ReviewStoreResult;

/// A unit of work against the store.
///
/// Every read and write issued through a transaction observes the writes made
/// earlier in the same transaction. Nothing is visible to other transactions
/// until [`ReviewTransaction::commit`] succeeds; dropping a transaction without
/// committing rolls it back.
#[async_trait]
pub trait ReviewTransaction: Send {
    /// Returns the team of a user, or `None` if the user is unknown.
    async fn user_team(&mut self, user_id: &str) -> ReviewStoreResult<Option<String>>;

    /// Returns true if a pull request with this ID exists.
    async fn pull_request_exists(&mut self, pull_request_id: &str) -> ReviewStoreResult<bool>;

    /// Lists every active member of `team_name`, skipping `exclude_user_id`
    /// and anyone in `exclude`. The order carries no meaning.
    async fn select_active_teammates(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        exclude: &[String],
    ) -> ReviewStoreResult<Vec<String>>;

    /// Inserts a pull request and returns the store-assigned creation time.
    ///
    /// Fails with `AlreadyExists` if the ID is taken.
    async fn insert_pull_request(
        &mut self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
        status: PullRequestStatus,
    ) -> ReviewStoreResult<DateTime<Utc>>;

    /// Replaces the reviewer set of a pull request.
    async fn set_reviewers(
        &mut self,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> ReviewStoreResult<()>;

    /// Fetches a pull request row and locks it for the rest of the transaction.
    async fn fetch_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<Option<PullRequestRecord>>;

    /// Marks a pull request as merged and returns the stored status and merge
    /// time. An existing merge time is kept.
    async fn update_status_merged(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<(PullRequestStatus, DateTime<Utc>)>;

    /// Returns true if `user_id` is an assigned reviewer of the pull request.
    async fn is_reviewer_of(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> ReviewStoreResult<bool>;

    /// Swaps one reviewer for another in a single relation update.
    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_user_id: &str,
        new_user_id: &str,
    ) -> ReviewStoreResult<()>;

    /// Lists the assigned reviewers of a pull request.
    async fn list_reviewers(&mut self, pull_request_id: &str) -> ReviewStoreResult<Vec<String>>;

    /// Commits all writes of this transaction.
    async fn commit(self: Box<Self>) -> ReviewStoreResult<()>;
}

/// Trait for review storage operations.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    // =========================================================================
    // Transactions
    // =========================================================================

    /// Opens a new transaction.
    async fn begin(&self) -> ReviewStoreResult<Box<dyn ReviewTransaction>>;

    // =========================================================================
    // Team operations
    // =========================================================================

    /// Creates a team and attaches its members.
    ///
    /// Members that are not known yet are created with the submitted username
    /// and activity flag. Known members are moved to the new team and keep
    /// their username and activity flag. Fails with `AlreadyExists` if the
    /// team name is taken.
    async fn add_team(&self, team: &Team) -> ReviewStoreResult<()>;

    /// Gets a team with its current members.
    async fn get_team(&self, team_name: &str) -> ReviewStoreResult<Option<Team>>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Gets a user by ID.
    async fn get_user(&self, user_id: &str) -> ReviewStoreResult<Option<User>>;

    /// Sets the activity flag of a user and returns the updated user.
    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewStoreResult<Option<User>>;

    /// Lists the pull requests a user is assigned to review.
    async fn list_reviews(&self, user_id: &str) -> ReviewStoreResult<Vec<PullRequestShort>>;

    /// Aggregates review counts per reviewer, busiest first.
    async fn user_activity(&self) -> ReviewStoreResult<Vec<UserActivity>>;

    // =========================================================================
    // Pull request reads
    // =========================================================================

    /// Gets a pull request with its reviewers.
    async fn get_pull_request(&self, pull_request_id: &str)
        -> ReviewStoreResult<Option<PullRequest>>;
}
