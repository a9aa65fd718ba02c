// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{harness, register, training};
use volunteer_trainer::{
    coordinator::CompletionRequest,
    jobs::TrainingStatus,
    ledger::{parse_address, token_units},
};

#[tokio::test]
async fn test_register_train_complete() {
    let h = harness();

    let volunteer = register(&h.coordinator, "a@b.com").await;
    let session = h
        .coordinator
        .login("a@b.com", &volunteer.password)
        .await
        .unwrap();
    assert_eq!(
        h.coordinator.authenticate(Some(&session.token)).unwrap().id,
        volunteer.id
    );

    let started = h.coordinator.start_training(training("job1")).await.unwrap();
    assert_eq!(started.job_id, "job1");
    let pending = h.coordinator.list_pending_jobs().await.unwrap();
    assert_eq!(pending.len(), 1);

    let receipt = h
        .coordinator
        .complete_job(CompletionRequest {
            doc_id: "job1".to_string(),
            status: "Completed".to_string(),
            results_url: "https://results.example.com/job1".to_string(),
            volunteer_address: volunteer.ethereum_address.clone(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.tokens_rewarded, "100");
    assert!(receipt.transaction_hash.starts_with("0x"));
    assert_eq!(receipt.transaction_hash.len(), 66);

    let job = h.coordinator.get_job("job1").await.unwrap();
    assert_eq!(job.record.training_status, TrainingStatus::Completed);
    assert_eq!(
        job.record.results_url.as_deref(),
        Some("https://results.example.com/job1")
    );
    assert!(h.coordinator.list_pending_jobs().await.unwrap().is_empty());

    let stored = h
        .coordinator
        .records()
        .volunteer(&volunteer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.record.tasks_completed, 1);

    let completions = h.coordinator.records().completions_for_job("job1").await.unwrap();
    assert_eq!(completions.len(), 1);
    let record = &completions[0].record;
    assert_eq!(record.volunteer_id, volunteer.id);
    assert_eq!(record.volunteer_name, "Volunteer");
    assert_eq!(record.job_id, "job1");
    assert_eq!(record.tokens_rewarded, "100");
    assert_eq!(record.transaction_hash, receipt.transaction_hash);

    let mints = h.ledger.mints().await;
    assert_eq!(mints.len(), 1);
    assert_eq!(mints[0].recipient, parse_address(&volunteer.ethereum_address).unwrap());
    assert_eq!(mints[0].amount, token_units(100));
}
