// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed description of the login → build → push pipeline.
//!
//! Each step is a program plus an argument vector; nothing is ever joined
//! into a shell string, and the registry password only travels on stdin.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A value that must not appear in logs or `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: Secret,
    /// Registry host; Docker Hub when `None`.
    pub registry: Option<String>,
}

/// What to build and where to push it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub image_tag: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub build_args: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Login,
    Build,
    Push,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepKind::Login => "login",
            StepKind::Build => "build",
            StepKind::Push => "push",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    pub kind: StepKind,
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Secret>,
}

impl CommandStep {
    pub fn new(kind: StepKind, program: impl Into<String>) -> Self {
        Self {
            kind,
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin(mut self, secret: Secret) -> Self {
        self.stdin = Some(secret);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub steps: Vec<CommandStep>,
}

impl PipelineSpec {
    /// Docker CLI steps for `request`. The login step is omitted without
    /// credentials, leaving push authentication to the local credential store.
    pub fn docker(
        docker_bin: &str,
        credentials: Option<&RegistryCredentials>,
        request: &BuildRequest,
    ) -> Self {
        let mut steps = Vec::with_capacity(3);

        if let Some(creds) = credentials {
            let mut login = CommandStep::new(StepKind::Login, docker_bin).arg("login");
            if let Some(registry) = &creds.registry {
                login = login.arg(registry.clone());
            }
            steps.push(
                login
                    .arg("--username")
                    .arg(creds.username.clone())
                    .arg("--password-stdin")
                    .stdin(creds.password.clone()),
            );
        }

        let mut build = CommandStep::new(StepKind::Build, docker_bin)
            .arg("build")
            .arg("-t")
            .arg(request.image_tag.clone())
            .arg("-f")
            .arg(request.dockerfile.display().to_string());
        for (key, value) in &request.build_args {
            build = build.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        steps.push(build.arg(request.context.display().to_string()));

        steps.push(
            CommandStep::new(StepKind::Push, docker_bin)
                .arg("push")
                .arg(request.image_tag.clone()),
        );

        Self { steps }
    }
}
