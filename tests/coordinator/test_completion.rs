// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{config, harness, harness_with, register, training, Harness};
use volunteer_trainer::{
    coordinator::{CompletionRequest, CoordinatorError, RegisteredVolunteer},
    jobs::TrainingStatus,
    ledger::{parse_address, token_units, LedgerError},
    store::collections,
    testing::ScriptedPipeline,
};

fn completion(doc_id: &str, address: &str) -> CompletionRequest {
    CompletionRequest {
        doc_id: doc_id.to_string(),
        status: "Completed".to_string(),
        results_url: "https://results.example.com/job1.tar.gz".to_string(),
        volunteer_address: address.to_string(),
    }
}

async fn with_job(h: &Harness) -> RegisteredVolunteer {
    let volunteer = register(&h.coordinator, "a@b.com").await;
    h.coordinator.start_training(training("job1")).await.unwrap();
    volunteer
}

async fn tasks_completed(h: &Harness, id: &str) -> u64 {
    h.coordinator
        .records()
        .volunteer(id)
        .await
        .unwrap()
        .unwrap()
        .record
        .tasks_completed
}

#[tokio::test]
async fn test_lowercase_address_is_matched() {
    let h = harness();
    let volunteer = with_job(&h).await;

    let lower = volunteer.ethereum_address.to_lowercase();
    let receipt = h
        .coordinator
        .complete_job(completion("job1", &lower))
        .await
        .unwrap();
    assert_eq!(receipt.volunteer_id, volunteer.id);

    let completions = h.coordinator.records().completions_for_job("job1").await.unwrap();
    assert_eq!(completions[0].record.ethereum_address, volunteer.ethereum_address);
}

#[tokio::test]
async fn test_reward_uses_token_decimals() {
    let h = harness();
    let volunteer = with_job(&h).await;
    h.coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap();

    let recipient = parse_address(&volunteer.ethereum_address).unwrap();
    assert_eq!(h.ledger.balance_of(recipient).await, token_units(100));
}

#[tokio::test]
async fn test_unknown_volunteer_leaves_job_completed_without_reward() {
    let h = harness();
    with_job(&h).await;

    let stranger = "0x000000000000000000000000000000000000dEaD";
    let err = h
        .coordinator
        .complete_job(completion("job1", stranger))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound(_)));

    let job = h.coordinator.get_job("job1").await.unwrap();
    assert_eq!(job.record.training_status, TrainingStatus::Completed);
    assert!(h.ledger.mints().await.is_empty());
    assert_eq!(h.store.count(collections::COMPLETED_JOBS).await, 0);
}

#[tokio::test]
async fn test_failed_mint_keeps_earlier_effects() {
    let h = harness();
    let volunteer = with_job(&h).await;
    h.ledger
        .set_failure(Some(LedgerError::Rpc("connection refused".to_string())))
        .await;

    let err = h
        .coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Chain(_)));

    assert_eq!(tasks_completed(&h, &volunteer.id).await, 1);
    let job = h.coordinator.get_job("job1").await.unwrap();
    assert_eq!(job.record.training_status, TrainingStatus::Completed);
    assert_eq!(h.store.count(collections::COMPLETED_JOBS).await, 0);
}

#[tokio::test]
async fn test_double_completion_is_rejected_by_default() {
    let h = harness();
    let volunteer = with_job(&h).await;
    h.coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap();

    let err = h
        .coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::IllegalTransition { .. }));
    assert_eq!(tasks_completed(&h, &volunteer.id).await, 1);
    assert_eq!(h.ledger.mints().await.len(), 1);
}

#[tokio::test]
async fn test_double_completion_rewards_twice_when_allowed() {
    let mut config = config();
    config.idempotent_completion = false;
    let h = harness_with(config, ScriptedPipeline::succeeding());
    let volunteer = with_job(&h).await;

    let first = h
        .coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap();
    let second = h
        .coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap();

    assert_ne!(first.transaction_hash, second.transaction_hash);
    assert_eq!(tasks_completed(&h, &volunteer.id).await, 2);
    assert_eq!(h.ledger.mints().await.len(), 2);
    assert_eq!(
        h.coordinator
            .records()
            .completions_for_job("job1")
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_cancelled_job_cannot_be_completed() {
    let h = harness();
    let volunteer = with_job(&h).await;
    h.coordinator
        .update_job_status("job1", "Cancelled")
        .await
        .unwrap();

    let err = h
        .coordinator
        .complete_job(completion("job1", &volunteer.ethereum_address))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::IllegalTransition { .. }));
    assert_eq!(tasks_completed(&h, &volunteer.id).await, 0);
}

#[tokio::test]
async fn test_malformed_input_writes_nothing() {
    let h = harness();
    let volunteer = with_job(&h).await;

    let mut bad_url = completion("job1", &volunteer.ethereum_address);
    bad_url.results_url = "results/job1".to_string();
    let bad_address = completion("job1", "0x1234");
    let mut bad_status = completion("job1", &volunteer.ethereum_address);
    bad_status.status = "Running".to_string();

    for request in [bad_url, bad_address, bad_status] {
        let err = h.coordinator.complete_job(request).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Validation { .. }));
    }

    let job = h.coordinator.get_job("job1").await.unwrap();
    assert_eq!(job.record.training_status, TrainingStatus::Pending);
    assert_eq!(tasks_completed(&h, &volunteer.id).await, 0);
}
