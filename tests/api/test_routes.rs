// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::app;
use axum::http::{Method, StatusCode};
use serde_json::json;
use volunteer_trainer::container::StepKind;

fn start_body(doc_id: &str) -> serde_json::Value {
    json!({"docId": doc_id, "modelId": "gpt2", "datasetId": "imdb"})
}

#[tokio::test]
async fn test_health() {
    let app = app(true);
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    let features = body["features"].as_array().unwrap();
    assert!(features.iter().any(|f| f == "token-rewards"));
}

#[tokio::test]
async fn test_register_returns_credentials_once() {
    let app = app(true);
    let (registered, _) = app.volunteer_session().await;
    assert_eq!(registered["message"], "Volunteer registered successfully");
    assert!(registered["ethereumAddress"].as_str().unwrap().starts_with("0x"));
    assert!(registered["privateKey"].as_str().unwrap().starts_with("0x"));
    assert!(registered["id"].is_string());
}

#[tokio::test]
async fn test_register_validation() {
    let app = app(true);
    let (status, body) = app
        .send(Method::POST, "/register-volunteer", Some(json!({"name": "Ada"})), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "email");

    let (status, body) = app.send(Method::POST, "/register-volunteer", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_all_jobs_empty_message() {
    let app = app(false);
    let (status, body) = app.send(Method::GET, "/all-jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No training jobs available");

    let (status, body) = app.send(Method::GET, "/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_training_job_lifecycle() {
    let app = app(false);
    let (status, body) = app
        .send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobId"], "job1");
    assert_eq!(body["imageTag"], "alice/training_job_job1");

    let (status, body) = app.send(Method::GET, "/jobs/job1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "job1");
    assert_eq!(body["trainingStatus"], "Pending");
    assert_eq!(body["modelId"], "gpt2");

    let (status, body) = app.send(Method::GET, "/all-jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(
            Method::PATCH,
            "/jobs/job1/status",
            Some(json!({"status": "Running"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trainingStatus"], "Running");

    let (_, body) = app.send(Method::GET, "/jobs", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_start_training_errors() {
    let app = app(false);
    app.send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;

    let (status, body) = app
        .send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "conflict");

    app.pipeline.set_failing_step(Some(StepKind::Build)).await;
    let (status, body) = app
        .send(Method::POST, "/start-training", Some(start_body("job2")), None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_type"], "external_tool_error");

    let (status, _) = app.send(Method::GET, "/jobs/job2", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_illegal_status_change() {
    let app = app(false);
    app.send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;
    app.send(
        Method::PATCH,
        "/jobs/job1/status",
        Some(json!({"status": "Cancelled"})),
        None,
    )
    .await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/jobs/job1/status",
            Some(json!({"status": "Pending"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "illegal_transition");
    assert_eq!(body["details"]["from"], "Cancelled");
}

#[tokio::test]
async fn test_complete_job_rewards_volunteer() {
    let app = app(false);
    let (registered, _) = app.volunteer_session().await;
    app.send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/complete-job",
            Some(json!({
                "docId": "job1",
                "status": "Completed",
                "resultsUrl": "https://results.example.com/job1",
                "volunteerAddress": registered["ethereumAddress"],
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Job marked as completed and volunteer rewarded successfully."
    );
    assert_eq!(body["tokensRewarded"], "100");
    assert!(body["transactionHash"].as_str().unwrap().starts_with("0x"));
    assert_eq!(app.ledger.mints().await.len(), 1);

    let (_, job) = app.send(Method::GET, "/jobs/job1", None, None).await;
    assert_eq!(job["trainingStatus"], "Completed");
    assert_eq!(job["resultsUrl"], "https://results.example.com/job1");
}

#[tokio::test]
async fn test_complete_job_unknown_volunteer() {
    let app = app(false);
    app.send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/complete-job",
            Some(json!({
                "docId": "job1",
                "status": "Completed",
                "resultsUrl": "https://results.example.com/job1",
                "volunteerAddress": "0x000000000000000000000000000000000000dEaD",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
    assert!(app.ledger.mints().await.is_empty());
}

#[tokio::test]
async fn test_status_route_cannot_complete_a_job() {
    let app = app(false);
    let (registered, _) = app.volunteer_session().await;
    app.send(Method::POST, "/start-training", Some(start_body("job1")), None)
        .await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/jobs/job1/status",
            Some(json!({"status": "Completed"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = app
        .send(
            Method::POST,
            "/complete-job",
            Some(json!({
                "docId": "job1",
                "status": "Completed",
                "resultsUrl": "https://results.example.com/job1",
                "volunteerAddress": registered["ethereumAddress"],
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokensRewarded"], "100");
    assert_eq!(app.ledger.mints().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_job_with_foreign_id_is_not_found() {
    let app = app(false);
    for uri in ["/jobs/job%201", "/jobs/a@b"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error_type"], "not_found");
    }
}
