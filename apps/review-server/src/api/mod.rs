//! API endpoints.

pub mod pull_request;
pub mod team;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use review_store::ReviewStore;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: ReviewStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Team endpoints
        .route("/team/add", post(team::add_team))
        .route("/team/get", get(team::get_team))
        // User endpoints
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/users/getActivity", get(users::get_activity))
        // Pull request endpoints
        .route("/pullRequest/create", post(pull_request::create_pull_request))
        .route("/pullRequest/merge", post(pull_request::merge_pull_request))
        .route("/pullRequest/reassign", post(pull_request::reassign_pull_request))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
