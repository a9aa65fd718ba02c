// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::errors::ApiError;
use super::http_server::AppState;
use super::middleware::AuthenticatedVolunteer;
use crate::coordinator::{CompletionRequest, CoordinatorError, NewVolunteer, TrainingRequest};
use crate::host::SystemDetails;
use crate::jobs::TrainingStatus;
use crate::records::{Identified, TrainingJob};
use crate::version::{FEATURES, VERSION_NUMBER};

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: field.to_string(),
            message: format!("{} is required", field),
        });
    }
    Ok(())
}

// Requests

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVolunteerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl RegisterVolunteerRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("name", &self.name)?;
        required("email", &self.email)
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("email", &self.email)?;
        required("password", &self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrainingRequest {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub dataset_id: String,
    #[serde(default)]
    pub compute_requirements: Option<Value>,
}

impl StartTrainingRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("docId", &self.doc_id)?;
        required("modelId", &self.model_id)?;
        required("datasetId", &self.dataset_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobRequest {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results_url: String,
    #[serde(default)]
    pub volunteer_address: String,
}

impl CompleteJobRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("docId", &self.doc_id)?;
        required("status", &self.status)?;
        required("resultsUrl", &self.results_url)?;
        required("volunteerAddress", &self.volunteer_address)
    }
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVolunteerResponse {
    pub message: String,
    pub id: String,
    pub ethereum_address: String,
    pub private_key: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub volunteer_id: String,
    pub token: String,
    pub system_info: SystemDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrainingResponse {
    pub message: String,
    pub job_id: String,
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub message: String,
    pub training_status: TrainingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobResponse {
    pub message: String,
    pub transaction_hash: String,
    pub tokens_rewarded: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// Handlers

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
    })
}

pub async fn register_volunteer_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterVolunteerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterVolunteerResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let registered = state
        .coordinator
        .register_volunteer(NewVolunteer {
            name: request.name,
            email: request.email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterVolunteerResponse {
            message: "Volunteer registered successfully".to_string(),
            id: registered.id,
            ethereum_address: registered.ethereum_address,
            private_key: registered.private_key,
            password: registered.password,
        }),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let outcome = state
        .coordinator
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            // Do not reveal which emails are registered.
            CoordinatorError::NotFound(_) => ApiError::Unauthorized("Invalid credentials".to_string()),
            other => other.into(),
        })?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        volunteer_id: outcome.volunteer_id,
        token: outcome.token,
        system_info: outcome.system_info,
    }))
}

pub async fn start_training_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedVolunteer>>,
    payload: Result<Json<StartTrainingRequest>, JsonRejection>,
) -> Result<Json<StartTrainingResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    if let Some(Extension(caller)) = &caller {
        info!(volunteer_id = %caller.volunteer_id, doc_id = %request.doc_id, "Start training requested");
    }

    let started = state
        .coordinator
        .start_training(TrainingRequest {
            doc_id: request.doc_id,
            model_id: request.model_id,
            dataset_id: request.dataset_id,
            compute_requirements: request.compute_requirements,
        })
        .await?;

    Ok(Json(StartTrainingResponse {
        message: "Training job initiated, Docker image pushed, and metadata saved.".to_string(),
        job_id: started.job_id,
        image_tag: started.image_tag,
    }))
}

/// Pending jobs only.
pub async fn list_jobs_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Identified<TrainingJob>>>, ApiError> {
    Ok(Json(state.coordinator.list_pending_jobs().await?))
}

pub async fn list_all_jobs_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let jobs = state.coordinator.list_jobs().await?;
    if jobs.is_empty() {
        return Ok(Json(MessageResponse {
            message: "No training jobs available".to_string(),
        })
        .into_response());
    }
    Ok(Json(jobs).into_response())
}

pub async fn get_job_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<Identified<TrainingJob>>, ApiError> {
    Ok(Json(state.coordinator.get_job(&doc_id).await?))
}

pub async fn update_job_status_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let Json(request) = payload?;
    required("status", &request.status)?;

    let status = state
        .coordinator
        .update_job_status(&doc_id, &request.status)
        .await?;

    Ok(Json(UpdateStatusResponse {
        message: "Training status updated successfully".to_string(),
        training_status: status,
    }))
}

pub async fn complete_job_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedVolunteer>>,
    payload: Result<Json<CompleteJobRequest>, JsonRejection>,
) -> Result<Json<CompleteJobResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    if let Some(Extension(caller)) = &caller {
        info!(volunteer_id = %caller.volunteer_id, doc_id = %request.doc_id, "Job completion reported");
    }

    let receipt = state
        .coordinator
        .complete_job(CompletionRequest {
            doc_id: request.doc_id,
            status: request.status,
            results_url: request.results_url,
            volunteer_address: request.volunteer_address,
        })
        .await?;

    Ok(Json(CompleteJobResponse {
        message: "Job marked as completed and volunteer rewarded successfully.".to_string(),
        transaction_hash: receipt.transaction_hash,
        tokens_rewarded: receipt.tokens_rewarded,
    }))
}
