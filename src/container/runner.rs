// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{error, info, warn};

use super::spec::{BuildRequest, CommandStep, PipelineSpec, RegistryCredentials, StepKind};
use super::{ContainerError, ImagePipeline};

/// Runs the pipeline through a Docker-compatible CLI.
///
/// Steps run in order and the first non-zero exit stops the pipeline, the
/// same as chaining them with `&&`. Each output line is forwarded to
/// `tracing` as it arrives. A timeout kills the running step.
#[derive(Debug, Clone)]
pub struct DockerCliRunner {
    docker_bin: String,
    credentials: Option<RegistryCredentials>,
    timeout: Option<Duration>,
}

impl DockerCliRunner {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            credentials: None,
            timeout: None,
        }
    }

    pub fn with_credentials(mut self, credentials: RegistryCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an arbitrary spec under this runner's timeout.
    pub async fn run_spec(&self, spec: &PipelineSpec) -> Result<(), ContainerError> {
        let run = async {
            for step in &spec.steps {
                run_step(step).await?;
            }
            Ok(())
        };

        match self.timeout {
            // Dropping the future drops the child, and kill_on_drop terminates it.
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| ContainerError::Timeout(limit))?,
            None => run.await,
        }
    }
}

#[async_trait]
impl ImagePipeline for DockerCliRunner {
    async fn build_and_push(&self, request: &BuildRequest) -> Result<(), ContainerError> {
        let spec = PipelineSpec::docker(&self.docker_bin, self.credentials.as_ref(), request);
        let started = Instant::now();
        info!(image = %request.image_tag, steps = spec.steps.len(), "Starting image pipeline");

        match self.run_spec(&spec).await {
            Ok(()) => {
                info!(
                    image = %request.image_tag,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Image built and pushed"
                );
                Ok(())
            }
            Err(e) => {
                error!(image = %request.image_tag, error = %e, "Image pipeline failed");
                Err(e)
            }
        }
    }
}

async fn forward_lines<R>(step: StepKind, reader: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!(step = %step, "{}", line);
        } else {
            info!(step = %step, "{}", line);
        }
    }
}

async fn run_step(step: &CommandStep) -> Result<(), ContainerError> {
    let mut command = Command::new(&step.program);
    command
        .args(&step.args)
        .stdin(if step.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| ContainerError::Spawn {
        program: step.program.clone(),
        reason: e.to_string(),
    })?;

    if let (Some(secret), Some(mut stdin)) = (&step.stdin, child.stdin.take()) {
        stdin.write_all(secret.expose().as_bytes()).await?;
        stdin.shutdown().await?;
    }

    let stdout = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(step.kind, out, false)));
    let stderr = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward_lines(step.kind, err, true)));

    let status = child.wait().await?;

    for task in [stdout, stderr].into_iter().flatten() {
        let _ = task.await;
    }

    if status.success() {
        Ok(())
    } else {
        Err(ContainerError::StepFailed {
            step: step.kind,
            code: status.code(),
        })
    }
}
