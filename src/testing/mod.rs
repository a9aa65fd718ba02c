// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process stand-ins for the external collaborators, for integration
//! tests and local runs without Docker or a chain.

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::container::{BuildRequest, ContainerError, ImagePipeline, StepKind};
use crate::ledger::{LedgerError, TokenLedger};

pub use crate::host::StaticSystemInfo;

/// Records every build request and answers with a fixed outcome.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPipeline {
    failing_step: Arc<RwLock<Option<StepKind>>>,
    requests: Arc<RwLock<Vec<BuildRequest>>>,
}

impl ScriptedPipeline {
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Every run fails at `step` with exit code 1.
    pub fn failing_at(step: StepKind) -> Self {
        Self {
            failing_step: Arc::new(RwLock::new(Some(step))),
            ..Self::default()
        }
    }

    pub async fn set_failing_step(&self, step: Option<StepKind>) {
        *self.failing_step.write().await = step;
    }

    pub async fn requests(&self) -> Vec<BuildRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl ImagePipeline for ScriptedPipeline {
    async fn build_and_push(&self, request: &BuildRequest) -> Result<(), ContainerError> {
        self.requests.write().await.push(request.clone());
        match *self.failing_step.read().await {
            Some(step) => Err(ContainerError::StepFailed {
                step,
                code: Some(1),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MintCall {
    pub recipient: Address,
    pub amount: U256,
    pub tx_hash: H256,
}

/// Ledger that records mints in memory. Transaction hashes count up from 1.
#[derive(Debug, Clone, Default)]
pub struct RecordingLedger {
    failure: Arc<RwLock<Option<LedgerError>>>,
    mints: Arc<RwLock<Vec<MintCall>>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent mints fail with `error`, or succeed again with `None`.
    pub async fn set_failure(&self, error: Option<LedgerError>) {
        *self.failure.write().await = error;
    }

    pub async fn mints(&self) -> Vec<MintCall> {
        self.mints.read().await.clone()
    }

    /// Total minted to `recipient`, in base units.
    pub async fn balance_of(&self, recipient: Address) -> U256 {
        self.mints
            .read()
            .await
            .iter()
            .filter(|m| m.recipient == recipient)
            .fold(U256::zero(), |total, m| total + m.amount)
    }
}

#[async_trait]
impl TokenLedger for RecordingLedger {
    async fn mint(&self, recipient: Address, amount: U256) -> Result<H256, LedgerError> {
        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }
        let mut mints = self.mints.write().await;
        let tx_hash = H256::from_low_u64_be(mints.len() as u64 + 1);
        mints.push(MintCall {
            recipient,
            amount,
            tx_hash,
        });
        Ok(tx_hash)
    }
}
