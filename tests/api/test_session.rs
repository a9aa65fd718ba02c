// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{app, SECRET};
use axum::http::{Method, StatusCode};
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use volunteer_trainer::auth::SessionTokens;

#[tokio::test]
async fn test_job_routes_require_a_token() {
    let app = app(true);
    let (status, body) = app.send(Method::GET, "/jobs", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let app = app(true);
    let (status, body) = app.send(Method::GET, "/jobs", None, Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");

    let foreign = SessionTokens::new(b"someone-else", Duration::from_secs(60))
        .issue("v1")
        .unwrap();
    let (status, _) = app.send(Method::GET, "/jobs", None, Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = app(true);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let expired = SessionTokens::new(SECRET, Duration::from_secs(60))
        .issue_at("v1", now - 3600)
        .unwrap();
    let (status, _) = app.send(Method::GET, "/jobs", None, Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_token_opens_job_routes() {
    let app = app(true);
    let (_, token) = app.volunteer_session().await;

    let (status, body) = app.send(Method::GET, "/jobs", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = app
        .send(
            Method::POST,
            "/start-training",
            Some(json!({"docId": "job1", "modelId": "gpt2", "datasetId": "imdb"})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_registration() {
    let app = app(true);
    app.volunteer_session().await;

    let (wrong_password, _) = app
        .send(
            Method::POST,
            "/login",
            Some(json!({"email": "a@b.com", "password": "guess"})),
            None,
        )
        .await;
    let (unknown_email, body) = app
        .send(
            Method::POST,
            "/login",
            Some(json!({"email": "nobody@b.com", "password": "guess"})),
            None,
        )
        .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_sessions_can_be_disabled() {
    let app = app(false);
    let (status, _) = app.send(Method::GET, "/all-jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
