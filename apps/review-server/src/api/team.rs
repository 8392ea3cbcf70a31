//! Team API endpoints.

use std::sync::Arc;

use api_protocol::{Team, requests::*, responses::*};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use review_store::ReviewStore;

use crate::error::ServerResult;
use crate::services::directory;
use crate::state::AppState;

/// Creates a team with its members.
pub async fn add_team<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<TeamAddRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<TeamAddResponse>)> {
    let Json(request) = payload?;
    request.validate()?;

    let team = directory::add_team(&state.store, request.into_team()).await?;

    Ok((StatusCode::CREATED, Json(TeamAddResponse { team })))
}

/// Gets a team by name.
pub async fn get_team<S: ReviewStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<TeamGetQuery>, QueryRejection>,
) -> ServerResult<Json<Team>> {
    let Query(query) = query?;
    query.validate()?;

    let team = directory::get_team(&state.store, &query.team_name).await?;

    Ok(Json(team))
}
