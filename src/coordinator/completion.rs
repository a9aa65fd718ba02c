// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use tracing::{error, info, warn};

use super::error::{CoordinatorError, CoordinatorResult};
use super::{validation, JobCoordinator};
use crate::jobs::TrainingStatus;
use crate::ledger::{checksum, token_units};
use crate::records::CompletedJob;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub doc_id: String,
    pub status: String,
    pub results_url: String,
    pub volunteer_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReceipt {
    pub job_id: String,
    pub volunteer_id: String,
    /// `0x`-prefixed hash of the mint transaction
    pub transaction_hash: String,
    pub tokens_rewarded: String,
}

impl JobCoordinator {
    /// Mark a job completed and reward the volunteer who trained it.
    ///
    /// Effects happen in this order and none is undone on a later failure:
    ///
    /// 1. the job's `trainingStatus` and `resultsUrl` are written
    /// 2. the volunteer is looked up by address
    /// 3. their `tasksCompleted` is incremented
    /// 4. the reward is minted
    /// 5. a `CompletedJob` record is appended
    ///
    /// A missing volunteer or a failed mint therefore leaves the job
    /// completed without a reward. With `idempotent_completion` set, such a
    /// job cannot be completed again.
    pub async fn complete_job(&self, request: CompletionRequest) -> CoordinatorResult<CompletionReceipt> {
        let doc_id = validation::doc_ref(&request.doc_id)?;
        let status = validation::status("status", &request.status)?;
        if status != TrainingStatus::Completed {
            return Err(CoordinatorError::validation(
                "status",
                format!("status must be Completed to claim a reward, got {}", status),
            ));
        }
        let results_url = validation::absolute_url("resultsUrl", &request.results_url)?.to_string();
        let recipient = validation::address("volunteerAddress", &request.volunteer_address)?;
        let address = checksum(&recipient);

        let job = self.get_job(doc_id).await?;
        let current = job.record.training_status;
        let repeat_allowed = !self.config.idempotent_completion && current == TrainingStatus::Completed;
        if !(current.can_transition_to(TrainingStatus::Completed) || repeat_allowed) {
            return Err(CoordinatorError::IllegalTransition {
                from: current,
                to: TrainingStatus::Completed,
            });
        }
        if repeat_allowed {
            warn!(job_id = %job.id, "Completing an already completed job; the volunteer is rewarded again");
        }

        self.records
            .set_job_status(&job.id, TrainingStatus::Completed, Some(&results_url))
            .await?;
        info!(job_id = %job.id, "Training job marked completed");

        let volunteer = match self.records.volunteer_by_address(&address).await? {
            Some(volunteer) => volunteer,
            None => {
                warn!(job_id = %job.id, %address, "Job completed but no volunteer has this address; no reward");
                return Err(CoordinatorError::NotFound(format!("Volunteer {}", address)));
            }
        };

        self.records.increment_tasks_completed(&volunteer.id).await?;

        let amount = token_units(self.config.reward_tokens);
        let tx_hash = match self.ledger.mint(recipient, amount).await {
            Ok(hash) => hash,
            Err(e) => {
                error!(job_id = %job.id, volunteer_id = %volunteer.id, error = %e, "Reward mint failed after job was completed");
                return Err(e.into());
            }
        };
        let transaction_hash = format!("{:#x}", tx_hash);
        let tokens_rewarded = self.config.reward_tokens.to_string();
        info!(job_id = %job.id, volunteer_id = %volunteer.id, tx = %transaction_hash, "Volunteer rewarded");

        self.records
            .append_completion(&CompletedJob {
                volunteer_name: volunteer.record.name.clone(),
                volunteer_id: volunteer.id.clone(),
                ethereum_address: address,
                job_id: job.id.clone(),
                tokens_rewarded: tokens_rewarded.clone(),
                transaction_hash: transaction_hash.clone(),
                results_url,
            })
            .await?;

        Ok(CompletionReceipt {
            job_id: job.id,
            volunteer_id: volunteer.id,
            transaction_hash,
            tokens_rewarded,
        })
    }
}
