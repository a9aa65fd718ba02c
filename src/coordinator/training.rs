// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use super::error::{CoordinatorError, CoordinatorResult};
use super::{validation, JobCoordinator};
use crate::container::BuildRequest;
use crate::jobs::{image_tag, TrainingStatus};
use crate::records::{Identified, TrainingJob};
use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct TrainingRequest {
    pub doc_id: String,
    pub model_id: String,
    pub dataset_id: String,
    pub compute_requirements: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartedTraining {
    pub job_id: String,
    pub image_tag: String,
}

impl JobCoordinator {
    /// Build and push the trainer image, then record a `Pending` job under `doc_id`.
    ///
    /// Blocks for the whole pipeline. Nothing is written unless it succeeds.
    pub async fn start_training(&self, request: TrainingRequest) -> CoordinatorResult<StartedTraining> {
        let doc_id = validation::doc_id(&request.doc_id)?;
        let model_id = validation::identifier("modelId", &request.model_id)?;
        let dataset_id = validation::identifier("datasetId", &request.dataset_id)?;

        if self.records.job(doc_id).await?.is_some() {
            return Err(CoordinatorError::Conflict(format!(
                "Training job {} already exists",
                doc_id
            )));
        }

        let tag = image_tag(&self.config.registry_namespace, doc_id);
        let mut build_args = self.config.build_args.clone();
        build_args.insert("MODEL_ID".to_string(), model_id.to_string());
        build_args.insert("DATASET_ID".to_string(), dataset_id.to_string());

        let build = BuildRequest {
            image_tag: tag.clone(),
            dockerfile: self.config.dockerfile.clone(),
            context: self.config.context.clone(),
            build_args,
        };

        if let Err(e) = self.pipeline.build_and_push(&build).await {
            error!(job_id = %doc_id, image = %tag, error = %e, "Training image pipeline failed");
            return Err(e.into());
        }

        let job = TrainingJob {
            model_id: model_id.to_string(),
            dataset_id: dataset_id.to_string(),
            image_tag: tag.clone(),
            compute_requirements: request.compute_requirements,
            training_status: TrainingStatus::Pending,
            created_at: Utc::now(),
            results_url: None,
        };

        // The image is already pushed at this point; a failed write leaves it orphaned.
        match self.records.insert_job(doc_id, &job).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                return Err(CoordinatorError::Conflict(format!(
                    "Training job {} already exists",
                    doc_id
                )))
            }
            Err(e) => {
                error!(job_id = %doc_id, image = %tag, error = %e, "Image pushed but job record was not saved");
                return Err(e.into());
            }
        }

        info!(job_id = %doc_id, image = %tag, "Training job created");
        Ok(StartedTraining {
            job_id: doc_id.to_string(),
            image_tag: tag,
        })
    }

    pub async fn list_jobs(&self) -> CoordinatorResult<Vec<Identified<TrainingJob>>> {
        Ok(self.records.jobs().await?)
    }

    /// Jobs still waiting for a volunteer.
    pub async fn list_pending_jobs(&self) -> CoordinatorResult<Vec<Identified<TrainingJob>>> {
        Ok(self.records.jobs_with_status(TrainingStatus::Pending).await?)
    }

    pub async fn get_job(&self, doc_id: &str) -> CoordinatorResult<Identified<TrainingJob>> {
        let doc_id = validation::doc_ref(doc_id)?;
        self.records
            .job(doc_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("Training job {}", doc_id)))
    }

    /// Move a job to `status` if the transition table allows it.
    ///
    /// `Completed` is refused here: only [`Self::complete_job`] may set it,
    /// since completion carries the reward.
    pub async fn update_job_status(&self, doc_id: &str, status: &str) -> CoordinatorResult<TrainingStatus> {
        let next = validation::status("status", status)?;
        if next == TrainingStatus::Completed {
            return Err(CoordinatorError::validation(
                "status",
                "jobs are completed through /complete-job, which rewards the volunteer",
            ));
        }
        let job = self.get_job(doc_id).await?;
        let current = job.record.training_status;

        if !current.can_transition_to(next) {
            return Err(CoordinatorError::IllegalTransition {
                from: current,
                to: next,
            });
        }

        self.records.set_job_status(&job.id, next, None).await?;
        info!(job_id = %job.id, from = %current, to = %next, "Training status updated");
        Ok(next)
    }
}
