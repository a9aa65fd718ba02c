// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use std::time::Duration;
use volunteer_trainer::{
    auth::{PasswordHasher, SessionTokens},
    coordinator::{CoordinatorConfig, JobCoordinator, NewVolunteer, RegisteredVolunteer, TrainingRequest},
    store::InMemoryStore,
    testing::{RecordingLedger, ScriptedPipeline, StaticSystemInfo},
};

pub const SECRET: &[u8] = b"integration-secret";

pub struct Harness {
    pub coordinator: JobCoordinator,
    pub store: Arc<InMemoryStore>,
    pub pipeline: ScriptedPipeline,
    pub ledger: RecordingLedger,
}

pub fn config() -> CoordinatorConfig {
    CoordinatorConfig {
        registry_namespace: "alice".to_string(),
        password_hasher: PasswordHasher::with_iterations(1_000),
        ..CoordinatorConfig::default()
    }
}

pub fn harness_with(config: CoordinatorConfig, pipeline: ScriptedPipeline) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let ledger = RecordingLedger::new();
    let coordinator = JobCoordinator::new(
        store.clone(),
        Arc::new(pipeline.clone()),
        Arc::new(ledger.clone()),
        Arc::new(StaticSystemInfo::sample()),
        SessionTokens::new(SECRET, Duration::from_secs(24 * 3600)),
        config,
    );
    Harness {
        coordinator,
        store,
        pipeline,
        ledger,
    }
}

pub fn harness() -> Harness {
    harness_with(config(), ScriptedPipeline::succeeding())
}

pub fn training(doc_id: &str) -> TrainingRequest {
    TrainingRequest {
        doc_id: doc_id.to_string(),
        model_id: "distilbert-base-uncased".to_string(),
        dataset_id: "imdb".to_string(),
        compute_requirements: None,
    }
}

pub async fn register(coordinator: &JobCoordinator, email: &str) -> RegisteredVolunteer {
    coordinator
        .register_volunteer(NewVolunteer {
            name: "Volunteer".to_string(),
            email: email.to_string(),
        })
        .await
        .unwrap()
}
