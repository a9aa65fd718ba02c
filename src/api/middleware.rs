// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::errors::ApiError;
use super::http_server::AppState;

/// Volunteer id from a verified session token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedVolunteer {
    pub volunteer_id: String,
}

/// Rejects requests without a valid session token when sessions are required.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.require_session {
        let claims = state.coordinator.authenticate_headers(request.headers())?;
        request.extensions_mut().insert(AuthenticatedVolunteer {
            volunteer_id: claims.id,
        });
    }
    Ok(next.run(request).await)
}
