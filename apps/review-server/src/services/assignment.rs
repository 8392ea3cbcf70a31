//! Reviewer assignment engine.
//!
//! Creates, merges and reassigns pull requests. Every operation runs inside a
//! single store transaction: preconditions are checked against the same
//! snapshot the writes apply to, and an early return or a missed deadline
//! drops the transaction, which rolls it back.

use std::{future::Future, time::Duration};

use entities::{PullRequest, PullRequestStatus};
use rand::seq::SliceRandom;
use review_store::{ReviewStore, ReviewStoreError};

/// Maximum number of reviewers assigned when a pull request is created.
pub const MAX_INITIAL_REVIEWERS: usize = 2;

/// Failures of the assignment engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    /// The pull request ID is taken.
    #[error("pull request already exists")]
    PrExists,

    /// The pull request, author or reviewer does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The pull request is merged.
    #[error("pull request is merged")]
    PrMerged,

    /// The user is not a reviewer of the pull request.
    #[error("user is not a reviewer of this pull request")]
    NotAssigned,

    /// Nobody in the team can take over the review.
    #[error("no active replacement candidate in team")]
    NoCandidate,

    /// Store failure or missed deadline. Details are logged, never returned.
    #[error("{0}")]
    Internal(&'static str),
}

impl AssignmentError {
    /// Returns the wire error code.
    pub fn code(&self) -> &'static str {
        use api_protocol::error_codes;

        match self {
            Self::PrExists => error_codes::PR_EXISTS,
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::PrMerged => error_codes::PR_MERGED,
            Self::NotAssigned => error_codes::NOT_ASSIGNED,
            Self::NoCandidate => error_codes::NO_CANDIDATE,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl From<ReviewStoreError> for AssignmentError {
    fn from(err: ReviewStoreError) -> Self {
        // Losing a concurrent insert race on the primary key.
        if err.is_already_exists("PullRequest") {
            return Self::PrExists;
        }
        tracing::error!(error = %err, "Review store failure");
        Self::Internal("internal error")
    }
}

/// Result type for assignment operations.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The pull request with its updated reviewer set.
    pub pull_request: PullRequest,
    /// The reviewer that took over.
    pub replaced_by: String,
}

/// Draws up to `limit` distinct candidates uniformly at random.
pub fn draw_reviewers(mut candidates: Vec<String>, limit: usize) -> Vec<String> {
    candidates.shuffle(&mut rand::rng());
    candidates.truncate(limit);
    candidates
}

/// Runs pull request operations against a store.
pub struct AssignmentEngine<'a, S: ReviewStore> {
    store: &'a S,
    operation_timeout: Duration,
}

impl<'a, S: ReviewStore> AssignmentEngine<'a, S> {
    /// Creates an engine whose operations give up after `operation_timeout`.
    pub fn new(store: &'a S, operation_timeout: Duration) -> Self {
        Self {
            store,
            operation_timeout,
        }
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = AssignmentResult<T>>,
    ) -> AssignmentResult<T> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, "Operation timed out, transaction rolled back");
                Err(AssignmentError::Internal("operation timed out"))
            }
        }
    }

    /// Creates an open pull request and assigns up to two active teammates of
    /// the author as reviewers.
    ///
    /// Having fewer eligible teammates is not an error; the reviewer set may
    /// be empty.
    pub async fn create(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> AssignmentResult<PullRequest> {
        self.with_deadline(
            "create",
            self.create_in_tx(pull_request_id, pull_request_name, author_id),
        )
        .await
    }

    async fn create_in_tx(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> AssignmentResult<PullRequest> {
        let mut tx = self.store.begin().await?;

        if tx.pull_request_exists(pull_request_id).await? {
            return Err(AssignmentError::PrExists);
        }
        let team = tx
            .user_team(author_id)
            .await?
            .ok_or(AssignmentError::NotFound("author"))?;

        let status = PullRequestStatus::Open;
        let created_at = tx
            .insert_pull_request(pull_request_id, pull_request_name, author_id, status)
            .await?;

        let candidates = tx.select_active_teammates(&team, author_id, &[]).await?;
        let reviewers = draw_reviewers(candidates, MAX_INITIAL_REVIEWERS);
        tx.set_reviewers(pull_request_id, &reviewers).await?;

        tx.commit().await?;

        tracing::info!(
            pull_request_id,
            author_id,
            team = %team,
            reviewers = ?reviewers,
            "Pull request created"
        );

        Ok(PullRequest {
            pull_request_id: pull_request_id.to_string(),
            pull_request_name: pull_request_name.to_string(),
            author_id: author_id.to_string(),
            status,
            assigned_reviewers: reviewers,
            created_at: Some(created_at),
            merged_at: None,
        })
    }

    /// Marks a pull request as merged.
    ///
    /// `status_hint` is the caller's last known status. When it is already
    /// `Merged`, the stored record is returned as is and nothing is written,
    /// whatever the stored status says. Otherwise the status moves to `Merged`
    /// and the merge time is stamped; an existing merge time is kept.
    pub async fn merge(
        &self,
        pull_request_id: &str,
        status_hint: Option<PullRequestStatus>,
    ) -> AssignmentResult<PullRequest> {
        self.with_deadline("merge", self.merge_in_tx(pull_request_id, status_hint))
            .await
    }

    async fn merge_in_tx(
        &self,
        pull_request_id: &str,
        status_hint: Option<PullRequestStatus>,
    ) -> AssignmentResult<PullRequest> {
        let mut tx = self.store.begin().await?;

        let mut record = tx
            .fetch_pull_request(pull_request_id)
            .await?
            .ok_or(AssignmentError::NotFound("pull request"))?;

        if status_hint == Some(PullRequestStatus::Merged) {
            let reviewers = tx.list_reviewers(pull_request_id).await?;
            tracing::debug!(pull_request_id, "Merge skipped, caller reports it merged");
            return Ok(PullRequest::from_record(record, reviewers));
        }

        let (status, merged_at) = tx.update_status_merged(pull_request_id).await?;
        record.status = status;
        record.merged_at = Some(merged_at);
        let reviewers = tx.list_reviewers(pull_request_id).await?;

        tx.commit().await?;

        tracing::info!(pull_request_id, merged_at = %merged_at, "Pull request merged");

        Ok(PullRequest::from_record(record, reviewers))
    }

    /// Replaces `old_reviewer_id` on a pull request with a random active
    /// teammate of the author who is neither the author nor already a
    /// reviewer.
    ///
    /// Checks run in order: the pull request and the old reviewer must exist,
    /// the old reviewer must be assigned, and the pull request must be open.
    pub async fn reassign(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> AssignmentResult<Reassignment> {
        self.with_deadline(
            "reassign",
            self.reassign_in_tx(pull_request_id, old_reviewer_id),
        )
        .await
    }

    async fn reassign_in_tx(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> AssignmentResult<Reassignment> {
        let mut tx = self.store.begin().await?;

        let record = tx
            .fetch_pull_request(pull_request_id)
            .await?
            .ok_or(AssignmentError::NotFound("pull request"))?;
        if tx.user_team(old_reviewer_id).await?.is_none() {
            return Err(AssignmentError::NotFound("reviewer"));
        }
        if !tx.is_reviewer_of(pull_request_id, old_reviewer_id).await? {
            return Err(AssignmentError::NotAssigned);
        }
        if record.status.is_terminal() {
            return Err(AssignmentError::PrMerged);
        }

        let team = tx
            .user_team(&record.author_id)
            .await?
            .ok_or(AssignmentError::NotFound("author"))?;
        let current = tx.list_reviewers(pull_request_id).await?;
        let candidates = tx
            .select_active_teammates(&team, &record.author_id, &current)
            .await?;
        let new_reviewer = draw_reviewers(candidates, 1)
            .pop()
            .ok_or(AssignmentError::NoCandidate)?;

        tx.replace_reviewer(pull_request_id, old_reviewer_id, &new_reviewer)
            .await?;
        let reviewers = tx.list_reviewers(pull_request_id).await?;

        tx.commit().await?;

        tracing::info!(
            pull_request_id,
            old_reviewer = old_reviewer_id,
            new_reviewer = %new_reviewer,
            "Reviewer reassigned"
        );

        Ok(Reassignment {
            pull_request: PullRequest::from_record(record, reviewers),
            replaced_by: new_reviewer,
        })
    }
}
