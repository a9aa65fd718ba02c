// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{CompletedJob, Identified, LoginRecord, TrainingJob, Volunteer};
use crate::jobs::TrainingStatus;
use crate::store::{collections, to_fields, Document, DocumentStore, Fields, StoreError};

fn identified<T: DeserializeOwned>(doc: Document) -> Result<Identified<T>, StoreError> {
    let record = doc.decode()?;
    Ok(Identified::new(doc.id, record))
}

fn identified_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<Identified<T>>, StoreError> {
    docs.into_iter().map(identified).collect()
}

/// Typed access to the coordinator's collections.
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn DocumentStore>,
}

impl Records {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    // Volunteers

    pub async fn create_volunteer(&self, volunteer: &Volunteer) -> Result<String, StoreError> {
        self.store
            .create(collections::VOLUNTEERS, to_fields(volunteer)?)
            .await
    }

    pub async fn volunteer(&self, id: &str) -> Result<Option<Identified<Volunteer>>, StoreError> {
        self.store
            .get(collections::VOLUNTEERS, id)
            .await?
            .map(identified)
            .transpose()
    }

    async fn first_volunteer_where(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Identified<Volunteer>>, StoreError> {
        self.store
            .find_equal(collections::VOLUNTEERS, field, &json!(value), Some(1))
            .await?
            .into_iter()
            .next()
            .map(identified)
            .transpose()
    }

    /// First volunteer registered with `email`. Emails are not unique.
    pub async fn volunteer_by_email(&self, email: &str) -> Result<Option<Identified<Volunteer>>, StoreError> {
        self.first_volunteer_where("email", email).await
    }

    /// Exact match on the stored (checksummed) address.
    pub async fn volunteer_by_address(&self, address: &str) -> Result<Option<Identified<Volunteer>>, StoreError> {
        self.first_volunteer_where("ethereumAddress", address).await
    }

    pub async fn increment_tasks_completed(&self, volunteer_id: &str) -> Result<(), StoreError> {
        self.store
            .increment(collections::VOLUNTEERS, volunteer_id, "tasksCompleted", 1)
            .await
    }

    // Training jobs

    pub async fn insert_job(&self, doc_id: &str, job: &TrainingJob) -> Result<(), StoreError> {
        self.store
            .insert(collections::TRAINING_JOBS, doc_id, to_fields(job)?)
            .await
    }

    pub async fn job(&self, doc_id: &str) -> Result<Option<Identified<TrainingJob>>, StoreError> {
        self.store
            .get(collections::TRAINING_JOBS, doc_id)
            .await?
            .map(identified)
            .transpose()
    }

    pub async fn jobs(&self) -> Result<Vec<Identified<TrainingJob>>, StoreError> {
        identified_all(self.store.list(collections::TRAINING_JOBS).await?)
    }

    pub async fn jobs_with_status(
        &self,
        status: TrainingStatus,
    ) -> Result<Vec<Identified<TrainingJob>>, StoreError> {
        let docs = self
            .store
            .find_equal(
                collections::TRAINING_JOBS,
                "trainingStatus",
                &json!(status.as_str()),
                None,
            )
            .await?;
        identified_all(docs)
    }

    /// Overwrite `trainingStatus`, and `resultsUrl` when given.
    pub async fn set_job_status(
        &self,
        doc_id: &str,
        status: TrainingStatus,
        results_url: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut fields = Fields::new();
        fields.insert("trainingStatus".to_string(), json!(status.as_str()));
        if let Some(url) = results_url {
            fields.insert("resultsUrl".to_string(), Value::String(url.to_string()));
        }
        self.store
            .update(collections::TRAINING_JOBS, doc_id, fields)
            .await
    }

    // Append-only logs

    pub async fn append_login(&self, record: &LoginRecord) -> Result<String, StoreError> {
        self.store
            .create(collections::LOGIN_RECORDS, to_fields(record)?)
            .await
    }

    pub async fn logins_for(&self, volunteer_id: &str) -> Result<Vec<Identified<LoginRecord>>, StoreError> {
        let docs = self
            .store
            .find_equal(collections::LOGIN_RECORDS, "volunteerId", &json!(volunteer_id), None)
            .await?;
        identified_all(docs)
    }

    pub async fn append_completion(&self, record: &CompletedJob) -> Result<String, StoreError> {
        self.store
            .create(collections::COMPLETED_JOBS, to_fields(record)?)
            .await
    }

    pub async fn completions_for_job(&self, job_id: &str) -> Result<Vec<Identified<CompletedJob>>, StoreError> {
        let docs = self
            .store
            .find_equal(collections::COMPLETED_JOBS, "jobId", &json!(job_id), None)
            .await?;
        identified_all(docs)
    }
}
