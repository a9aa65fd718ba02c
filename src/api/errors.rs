// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{error, warn};

use crate::coordinator::CoordinatorError;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    IllegalTransition {
        from: String,
        to: String,
    },
    ExternalToolError(String),
    ChainError(String),
    StoreError(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::Unauthorized(msg) => ("unauthorized", msg.clone(), None),
            ApiError::Forbidden(msg) => ("forbidden", msg.clone(), None),
            ApiError::Conflict(msg) => ("conflict", msg.clone(), None),
            ApiError::IllegalTransition { from, to } => {
                let mut details = HashMap::new();
                details.insert("from".to_string(), serde_json::Value::String(from.clone()));
                details.insert("to".to_string(), serde_json::Value::String(to.clone()));
                (
                    "illegal_transition",
                    format!("Cannot move a {} job to {}", from, to),
                    Some(details),
                )
            }
            ApiError::ExternalToolError(msg) => ("external_tool_error", msg.clone(), None),
            ApiError::ChainError(msg) => ("chain_error", msg.clone(), None),
            ApiError::StoreError(msg) => ("store_error", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) | ApiError::IllegalTransition { .. } => 409,
            ApiError::ExternalToolError(_) | ApiError::ChainError(_) => 502,
            ApiError::StoreError(_) | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::IllegalTransition { from, to } => {
                write!(f, "Illegal transition from {} to {}", from, to)
            }
            ApiError::ExternalToolError(msg) => write!(f, "External tool error: {}", msg),
            ApiError::ChainError(msg) => write!(f, "Chain error: {}", msg),
            ApiError::StoreError(msg) => write!(f, "Store error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self);
        } else {
            warn!(status = status.as_u16(), "{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Validation { field, message } => {
                ApiError::ValidationError { field, message }
            }
            CoordinatorError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            CoordinatorError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            CoordinatorError::Forbidden(msg) => ApiError::Forbidden(msg),
            CoordinatorError::Conflict(msg) => ApiError::Conflict(msg),
            CoordinatorError::IllegalTransition { from, to } => ApiError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            CoordinatorError::ExternalTool(e) => ApiError::ExternalToolError(e.to_string()),
            CoordinatorError::Chain(e) => ApiError::ChainError(e.to_string()),
            CoordinatorError::Store(e @ StoreError::NotFound { .. }) => {
                ApiError::NotFound(e.to_string())
            }
            CoordinatorError::Store(e) => ApiError::StoreError(e.to_string()),
            CoordinatorError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
