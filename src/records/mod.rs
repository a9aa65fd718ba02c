// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed records persisted in the document store.
//!
//! Field names are camelCase both on the wire and in the store. Ids are not
//! part of the records; they travel alongside in [`Identified`].

pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::SystemDetails;
use crate::jobs::TrainingStatus;

pub use repository::Records;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub name: String,
    pub email: String,
    pub ethereum_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub tasks_completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingJob {
    pub model_id: String,
    pub dataset_id: String,
    pub image_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_requirements: Option<Value>,
    pub training_status: TrainingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub volunteer_id: String,
    pub login_time: DateTime<Utc>,
    pub system_info: SystemDetails,
}

/// Audit record of a rewarded completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJob {
    pub volunteer_name: String,
    pub volunteer_id: String,
    pub ethereum_address: String,
    pub job_id: String,
    /// Whole tokens, as a decimal string
    pub tokens_rewarded: String,
    pub transaction_hash: String,
    pub results_url: String,
}

/// A record together with its document id, serialized flat as `{id, ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identified<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Identified<T> {
    pub fn new(id: impl Into<String>, record: T) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}
