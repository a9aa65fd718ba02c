// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod middleware;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    CompleteJobRequest, CompleteJobResponse, HealthResponse, LoginRequest, LoginResponse,
    MessageResponse, RegisterVolunteerRequest, RegisterVolunteerResponse, StartTrainingRequest,
    StartTrainingResponse, UpdateStatusRequest, UpdateStatusResponse,
};
pub use http_server::{create_app, start_server, AppState};
pub use middleware::AuthenticatedVolunteer;
