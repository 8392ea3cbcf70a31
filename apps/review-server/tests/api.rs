//! HTTP tests against the in-memory store.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use review_server::{config::Config, create_app, create_state};
use review_store::MemoryReviewStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_app(create_state(Config::default(), MemoryReviewStore::new()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn add_backend(app: &Router) {
    let (status, _) = post(
        app,
        "/team/add",
        json!({
            "team_name": "backend",
            "members": [
                {"user_id": "a", "username": "Alice", "is_active": true},
                {"user_id": "b", "username": "Bob", "is_active": true},
                {"user_id": "c", "username": "Carol", "is_active": true},
                {"user_id": "d", "username": "Dave", "is_active": false}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_team_add_and_get() {
    let app = app();
    add_backend(&app).await;

    let (status, body) = get(&app, "/team/get?team_name=backend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "backend");
    assert_eq!(body["members"].as_array().unwrap().len(), 4);

    let (status, body) = post(
        &app,
        "/team/add",
        json!({"team_name": "backend", "members": [{"user_id": "x", "username": "X", "is_active": true}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = get(&app, "/team/get?team_name=frontend").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_requests_are_bad_requests() {
    let app = app();

    let request = Request::post("/pullRequest/create")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = post(&app, "/pullRequest/create", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let (status, body) = get(&app, "/users/getReview").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let app = app();
    add_backend(&app).await;

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "feat", "author_id": "a"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pr = &body["pr"];
    assert_eq!(pr["status"], "OPEN");
    assert_eq!(pr["author_id"], "a");
    let mut reviewers: Vec<&str> = pr["assigned_reviewers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    reviewers.sort();
    assert_eq!(reviewers, vec!["b", "c"]);
    let created_at = pr["created_at"].as_str().unwrap();
    assert!(created_at.ends_with('Z'));
    assert!(pr.get("merged_at").is_none());

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "again", "author_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NO_CANDIDATE");

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["merged_at"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/pullRequest/merge",
        json!({"pull_request_id": "pr-1", "status": "MERGED"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["merged_at"], merged_at.as_str());

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");
}

#[tokio::test]
async fn test_reassign_through_http() {
    let app = app();
    add_backend(&app).await;
    post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "feat", "author_id": "a"}),
    )
    .await;

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "d", "is_active": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["team_name"], "backend");
    assert_eq!(body["user"]["is_active"], true);

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_reviewer_id": "c"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], "d");
    let reviewers = body["pr"]["assigned_reviewers"].as_array().unwrap();
    assert!(reviewers.contains(&json!("d")));
    assert!(!reviewers.contains(&json!("c")));

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "c"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NOT_ASSIGNED");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-9", "old_user_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_reviews_and_activity() {
    let app = app();
    add_backend(&app).await;
    post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "feat", "author_id": "a"}),
    )
    .await;

    let (status, body) = get(&app, "/users/getReview?user_id=b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "b");
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr-1");
    assert_eq!(body["pull_requests"][0]["status"], "OPEN");

    let (status, body) = get(&app, "/users/getReview?user_id=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = get(&app, "/users/getActivity").await;
    assert_eq!(status, StatusCode::OK);
    let activity = body["activity"].as_array().unwrap();
    assert_eq!(activity.len(), 2);
    assert!(activity.iter().all(|a| a["pull_requests"] == 1 && a["open_pr"] == 1));
}

#[tokio::test]
async fn test_create_for_unknown_author() {
    let app = app();

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "feat", "author_id": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}
