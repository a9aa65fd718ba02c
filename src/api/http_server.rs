// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    complete_job_handler, get_job_handler, health_handler, list_all_jobs_handler,
    list_jobs_handler, login_handler, register_volunteer_handler, start_training_handler,
    update_job_status_handler,
};
use super::middleware::require_session;
use crate::coordinator::JobCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<JobCoordinator>,
    /// Require a session token on everything but health, registration and login.
    pub require_session: bool,
}

impl AppState {
    pub fn new(coordinator: Arc<JobCoordinator>, require_session: bool) -> Self {
        Self {
            coordinator,
            require_session,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/start-training", post(start_training_handler))
        .route("/jobs", get(list_jobs_handler))
        .route("/all-jobs", get(list_all_jobs_handler))
        .route("/jobs/:doc_id", get(get_job_handler))
        .route("/jobs/:doc_id/status", patch(update_job_status_handler))
        .route("/complete-job", post(complete_job_handler))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health_handler))
        .route("/register-volunteer", post(register_volunteer_handler))
        .route("/login", post(login_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server<F>(
    state: AppState,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
