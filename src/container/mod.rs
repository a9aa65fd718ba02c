// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Container build/push runner
//!
//! Builds the trainer image for a job and pushes it to the registry. The
//! caller sees one success/failure outcome; step output goes to the log.

pub mod runner;
pub mod spec;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use runner::DockerCliRunner;
pub use spec::{BuildRequest, CommandStep, PipelineSpec, RegistryCredentials, Secret, StepKind};

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Pipeline I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline timed out after {0:?}")]
    Timeout(Duration),

    #[error("{step} step failed with exit code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    StepFailed { step: StepKind, code: Option<i32> },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImagePipeline: Send + Sync {
    /// Log in, build and push. Succeeds only if every step exits zero.
    async fn build_and_push(&self, request: &BuildRequest) -> Result<(), ContainerError>;
}
