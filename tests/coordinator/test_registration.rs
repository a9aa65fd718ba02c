// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{harness, register, SECRET};
use std::time::Duration;
use volunteer_trainer::{
    auth::SessionTokens,
    coordinator::{CoordinatorError, NewVolunteer},
    ledger::parse_address,
    store::collections,
};

#[tokio::test]
async fn test_register_then_login() {
    let h = harness();
    let registered = register(&h.coordinator, "a@b.com").await;

    assert!(parse_address(&registered.ethereum_address).is_ok());
    assert!(registered.private_key.starts_with("0x"));
    assert_eq!(registered.private_key.len(), 66);
    assert!(!registered.password.is_empty());

    let outcome = h
        .coordinator
        .login("a@b.com", &registered.password)
        .await
        .unwrap();
    assert_eq!(outcome.volunteer_id, registered.id);

    let verifier = SessionTokens::new(SECRET, Duration::from_secs(60));
    assert_eq!(verifier.verify(&outcome.token).unwrap().id, registered.id);

    let logins = h.coordinator.records().logins_for(&registered.id).await.unwrap();
    assert_eq!(logins.len(), 1);
}

#[tokio::test]
async fn test_stored_volunteer_never_holds_plaintext_secrets() {
    let h = harness();
    let registered = register(&h.coordinator, "a@b.com").await;

    let stored = h
        .coordinator
        .records()
        .volunteer(&registered.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.record.tasks_completed, 0);
    assert_eq!(stored.record.ethereum_address, registered.ethereum_address);
    let hash = stored.record.password_hash.unwrap();
    assert_ne!(hash, registered.password);
    assert!(!hash.contains(&registered.password));
    assert_eq!(h.store.count(collections::VOLUNTEERS).await, 1);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let h = harness();
    register(&h.coordinator, "a@b.com").await;

    let err = h.coordinator.login("a@b.com", "not-it").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::Unauthorized(_)));
    assert_eq!(h.store.count(collections::LOGIN_RECORDS).await, 0);
}

#[tokio::test]
async fn test_unknown_email() {
    let h = harness();
    let err = h.coordinator.login("nobody@b.com", "pw").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_email_rejected_before_write() {
    let h = harness();
    let err = h
        .coordinator
        .register_volunteer(NewVolunteer {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Validation { .. }));
    assert_eq!(h.store.count(collections::VOLUNTEERS).await, 0);
}
