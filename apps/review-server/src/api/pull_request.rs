//! Pull request API endpoints.

use std::sync::Arc;

use api_protocol::{requests::*, responses::*};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use review_store::ReviewStore;

use crate::error::ServerResult;
use crate::state::AppState;

/// Creates a pull request and assigns its reviewers.
pub async fn create_pull_request<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<PullRequestResponse>)> {
    let Json(request) = payload?;
    request.validate()?;

    let pr = state
        .assignment()
        .create(
            &request.pull_request_id,
            &request.pull_request_name,
            &request.author_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr: pr.into() })))
}

/// Marks a pull request as merged.
pub async fn merge_pull_request<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ServerResult<Json<PullRequestResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let pr = state
        .assignment()
        .merge(&request.pull_request_id, request.status)
        .await?;

    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

/// Replaces one reviewer of a pull request.
pub async fn reassign_pull_request<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ReassignPullRequestRequest>, JsonRejection>,
) -> ServerResult<Json<ReassignPullRequestResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state
        .assignment()
        .reassign(&request.pull_request_id, &request.old_user_id)
        .await?;

    Ok(Json(ReassignPullRequestResponse {
        pr: result.pull_request.into(),
        replaced_by: result.replaced_by,
    }))
}
