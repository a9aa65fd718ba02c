// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Job orchestration service
//!
//! [`JobCoordinator`] owns the volunteer and training-job lifecycle:
//!
//! - registration and login of volunteers
//! - building and publishing a trainer image per job
//! - status changes, checked against the transition table in [`crate::jobs`]
//! - completion, which rewards the volunteer on the token ledger
//!
//! Every collaborator is injected, so tests run against in-memory doubles.
//! Effects are applied in order and never rolled back; see
//! [`JobCoordinator::complete_job`] for the consequences.

pub mod completion;
pub mod error;
pub mod registration;
pub mod training;
pub mod validation;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{token_from_headers, PasswordHasher, SessionClaims, SessionError, SessionTokens};
use crate::container::ImagePipeline;
use crate::host::SystemInfoProvider;
use crate::ledger::TokenLedger;
use crate::records::Records;
use crate::store::DocumentStore;

pub use completion::{CompletionReceipt, CompletionRequest};
pub use error::{CoordinatorError, CoordinatorResult};
pub use registration::{LoginOutcome, NewVolunteer, RegisteredVolunteer};
pub use training::{StartedTraining, TrainingRequest};

/// Whole tokens minted per completed job.
pub const DEFAULT_REWARD_TOKENS: u64 = 100;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Registry namespace images are pushed under, usually the registry user name.
    pub registry_namespace: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    /// Build args passed to every trainer build, in addition to
    /// `MODEL_ID` and `DATASET_ID`.
    pub build_args: BTreeMap<String, String>,
    pub reward_tokens: u64,
    /// Reject completing a job that is already `Completed`.
    pub idempotent_completion: bool,
    pub password_hasher: PasswordHasher,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            registry_namespace: "volunteer".to_string(),
            dockerfile: PathBuf::from("./Trainer/Dockerfile"),
            context: PathBuf::from("./Trainer"),
            build_args: BTreeMap::new(),
            reward_tokens: DEFAULT_REWARD_TOKENS,
            idempotent_completion: true,
            password_hasher: PasswordHasher::default(),
        }
    }
}

pub struct JobCoordinator {
    records: Records,
    pipeline: Arc<dyn ImagePipeline>,
    ledger: Arc<dyn TokenLedger>,
    system_info: Arc<dyn SystemInfoProvider>,
    sessions: SessionTokens,
    config: CoordinatorConfig,
}

impl JobCoordinator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        pipeline: Arc<dyn ImagePipeline>,
        ledger: Arc<dyn TokenLedger>,
        system_info: Arc<dyn SystemInfoProvider>,
        sessions: SessionTokens,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            records: Records::new(store),
            pipeline,
            ledger,
            system_info,
            sessions,
            config,
        }
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionTokens {
        &self.sessions
    }

    /// Verify a session token. A missing token is `Forbidden`, a bad or
    /// expired one `Unauthorized`.
    pub fn authenticate(&self, token: Option<&str>) -> CoordinatorResult<SessionClaims> {
        let token = token.ok_or(SessionError::Missing)?;
        Ok(self.sessions.verify(token)?)
    }

    /// [`Self::authenticate`] with the token taken from request headers.
    pub fn authenticate_headers(&self, headers: &axum::http::HeaderMap) -> CoordinatorResult<SessionClaims> {
        self.authenticate(token_from_headers(headers))
    }
}
