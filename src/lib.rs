// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod auth;
pub mod config;
pub mod container;
pub mod coordinator;
pub mod host;
pub mod jobs;
pub mod ledger;
pub mod records;
pub mod store;
pub mod testing;
pub mod version;

pub use api::{create_app, start_server, ApiError, AppState};
pub use config::Settings;
pub use container::{DockerCliRunner, ImagePipeline};
pub use coordinator::{CoordinatorConfig, CoordinatorError, JobCoordinator};
pub use jobs::TrainingStatus;
pub use ledger::{EthersLedger, TokenLedger};
pub use store::{DocumentStore, FirestoreStore, InMemoryStore};
