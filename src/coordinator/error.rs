// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::auth::SessionError;
use crate::container::ContainerError;
use crate::host::HostError;
use crate::jobs::TrainingStatus;
use crate::ledger::LedgerError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        from: TrainingStatus,
        to: TrainingStatus,
    },

    #[error("Container pipeline failed: {0}")]
    ExternalTool(#[from] ContainerError),

    #[error("Ledger error: {0}")]
    Chain(#[from] LedgerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoordinatorError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        CoordinatorError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<SessionError> for CoordinatorError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Missing => CoordinatorError::Forbidden(err.to_string()),
            SessionError::Invalid | SessionError::Expired => {
                CoordinatorError::Unauthorized(err.to_string())
            }
            SessionError::Signing(reason) => CoordinatorError::Internal(reason),
        }
    }
}

impl From<HostError> for CoordinatorError {
    fn from(err: HostError) -> Self {
        CoordinatorError::Internal(err.to_string())
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
