//! User API endpoints.

use std::sync::Arc;

use api_protocol::{requests::*, responses::*};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use review_store::ReviewStore;

use crate::error::ServerResult;
use crate::services::directory;
use crate::state::AppState;

/// Sets the activity flag of a user.
pub async fn set_is_active<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ServerResult<Json<SetIsActiveResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let user = directory::set_is_active(&state.store, &request.user_id, request.is_active).await?;

    Ok(Json(SetIsActiveResponse { user }))
}

/// Lists the pull requests a user is assigned to review.
pub async fn get_review<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<GetReviewQuery>, QueryRejection>,
) -> ServerResult<Json<GetReviewResponse>> {
    let Query(query) = query?;
    query.validate()?;

    let pull_requests = directory::get_review(&state.store, &query.user_id).await?;

    Ok(Json(GetReviewResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}

/// Review statistics per reviewer.
pub async fn get_activity<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<GetActivityResponse>> {
    let activity = directory::get_activity(&state.store).await?;

    Ok(Json(GetActivityResponse { activity }))
}
