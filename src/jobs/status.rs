// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Training job status and its transition table.
//!
//! ```text
//!            ┌──────────► Cancelled
//!            │               ▲
//!  Pending ──┼──► Running ───┤
//!     ▲      │       │       └──► Failed ──┐
//!     │      │       ▼                     │
//!     │      └──► Completed                │
//!     └────────────────────────────────────┘ (requeue)
//! ```
//!
//! `Pending` may also go straight to `Completed` or `Failed`, since
//! volunteers report completion without an intermediate running report.
//! Rewriting a non-terminal status with itself is allowed. The status
//! endpoint never sets `Completed`; only job completion does.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TrainingStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown training status '{0}'")]
pub struct UnknownStatus(pub String);

impl TrainingStatus {
    pub const ALL: [TrainingStatus; 5] = [
        TrainingStatus::Pending,
        TrainingStatus::Running,
        TrainingStatus::Completed,
        TrainingStatus::Failed,
        TrainingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Pending => "Pending",
            TrainingStatus::Running => "Running",
            TrainingStatus::Completed => "Completed",
            TrainingStatus::Failed => "Failed",
            TrainingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingStatus::Completed | TrainingStatus::Cancelled)
    }

    /// Statuses reachable from `self` in one step, excluding the self-rewrite.
    pub fn successors(&self) -> &'static [TrainingStatus] {
        use TrainingStatus::*;
        match self {
            Pending => &[Running, Completed, Failed, Cancelled],
            Running => &[Completed, Failed, Cancelled],
            Failed => &[Pending],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: TrainingStatus) -> bool {
        (*self == next && !self.is_terminal()) || self.successors().contains(&next)
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingStatus {
    type Err = UnknownStatus;

    /// Case-insensitive, accepting the spellings volunteers' trainers report.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pending" | "queued" => Ok(TrainingStatus::Pending),
            "running" | "inprogress" | "training" | "started" => Ok(TrainingStatus::Running),
            "completed" | "complete" | "done" | "finished" => Ok(TrainingStatus::Completed),
            "failed" | "error" => Ok(TrainingStatus::Failed),
            "cancelled" | "canceled" => Ok(TrainingStatus::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for TrainingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrainingStatus> for String {
    fn from(status: TrainingStatus) -> Self {
        status.as_str().to_string()
    }
}
