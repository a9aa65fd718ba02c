// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{config, harness, harness_with, training};
use volunteer_trainer::{
    container::StepKind,
    coordinator::CoordinatorError,
    jobs::TrainingStatus,
    store::collections,
    testing::ScriptedPipeline,
};

#[tokio::test]
async fn test_start_training_records_pending_job() {
    let h = harness();
    let started = h.coordinator.start_training(training("job1")).await.unwrap();
    assert_eq!(started.job_id, "job1");
    assert_eq!(started.image_tag, "alice/training_job_job1");

    let requests = h.pipeline.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image_tag, "alice/training_job_job1");
    assert_eq!(requests[0].build_args["MODEL_ID"], "distilbert-base-uncased");
    assert_eq!(requests[0].build_args["DATASET_ID"], "imdb");

    let job = h.coordinator.get_job("job1").await.unwrap();
    assert_eq!(job.record.training_status, TrainingStatus::Pending);
    assert_eq!(job.record.image_tag, started.image_tag);
    assert!(job.record.results_url.is_none());
}

#[tokio::test]
async fn test_configured_build_args_are_passed_through() {
    let mut config = config();
    config
        .build_args
        .insert("GANACHE_URL".to_string(), "http://127.0.0.1:7545".to_string());
    let h = harness_with(config, ScriptedPipeline::succeeding());

    h.coordinator.start_training(training("job1")).await.unwrap();
    let requests = h.pipeline.requests().await;
    assert_eq!(requests[0].build_args["GANACHE_URL"], "http://127.0.0.1:7545");
    assert_eq!(requests[0].build_args.len(), 3);
}

#[tokio::test]
async fn test_failed_push_records_nothing() {
    let h = harness_with(config(), ScriptedPipeline::failing_at(StepKind::Push));
    let err = h.coordinator.start_training(training("job1")).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::ExternalTool(_)));
    assert_eq!(h.store.count(collections::TRAINING_JOBS).await, 0);

    h.pipeline.set_failing_step(None).await;
    h.coordinator.start_training(training("job1")).await.unwrap();
    assert_eq!(h.store.count(collections::TRAINING_JOBS).await, 1);
}

#[tokio::test]
async fn test_duplicate_doc_id_conflicts_without_rebuilding() {
    let h = harness();
    h.coordinator.start_training(training("job1")).await.unwrap();

    let err = h.coordinator.start_training(training("job1")).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::Conflict(_)));
    assert_eq!(h.pipeline.requests().await.len(), 1);
}

#[tokio::test]
async fn test_unsafe_identifiers_never_reach_the_pipeline() {
    let h = harness();
    let mut request = training("job1");
    request.model_id = "gpt2; rm -rf /".to_string();
    assert!(matches!(
        h.coordinator.start_training(request).await,
        Err(CoordinatorError::Validation { .. })
    ));

    assert!(matches!(
        h.coordinator.start_training(training("../job")).await,
        Err(CoordinatorError::Validation { .. })
    ));
    assert!(h.pipeline.requests().await.is_empty());
}

#[tokio::test]
async fn test_listing_and_status_updates() {
    let h = harness();
    assert!(h.coordinator.list_jobs().await.unwrap().is_empty());

    h.coordinator.start_training(training("job1")).await.unwrap();
    h.coordinator.start_training(training("job2")).await.unwrap();
    assert_eq!(h.coordinator.list_pending_jobs().await.unwrap().len(), 2);

    let status = h
        .coordinator
        .update_job_status("job1", "Running")
        .await
        .unwrap();
    assert_eq!(status, TrainingStatus::Running);

    let pending = h.coordinator.list_pending_jobs().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "job2");
    assert_eq!(h.coordinator.list_jobs().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_update_rules() {
    let h = harness();
    h.coordinator.start_training(training("job1")).await.unwrap();

    assert!(matches!(
        h.coordinator.update_job_status("job1", "Exploded").await,
        Err(CoordinatorError::Validation { .. })
    ));
    assert!(matches!(
        h.coordinator.update_job_status("missing", "Running").await,
        Err(CoordinatorError::NotFound(_))
    ));

    h.coordinator
        .update_job_status("job1", "Cancelled")
        .await
        .unwrap();
    match h.coordinator.update_job_status("job1", "Running").await {
        Err(CoordinatorError::IllegalTransition { from, to }) => {
            assert_eq!(from, TrainingStatus::Cancelled);
            assert_eq!(to, TrainingStatus::Running);
        }
        other => panic!("Expected illegal transition, got {:?}", other),
    }
}
