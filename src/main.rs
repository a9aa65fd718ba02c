// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::{env, sync::Arc};
use tokio::signal;
use tracing::{info, warn};
use volunteer_trainer::{
    api::{start_server, AppState},
    auth::SessionTokens,
    config::{LedgerBackend, Settings, StoreBackend},
    container::{DockerCliRunner, ImagePipeline},
    coordinator::JobCoordinator,
    host::SysinfoProvider,
    ledger::{EthersLedger, TokenLedger},
    store::{DocumentStore, FirestoreStore, InMemoryStore},
    testing::RecordingLedger,
    version,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());

    let settings = Settings::parse();
    settings.validate()?;

    let store: Arc<dyn DocumentStore> = match settings.store_backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Firestore => {
            let config = settings.firestore_config()?;
            info!(project = %config.project_id, emulator = ?config.emulator_host, "Using Firestore");
            Arc::new(FirestoreStore::new(config).context("failed to set up Firestore")?)
        }
    };

    let mut runner = DockerCliRunner::new(settings.docker_bin.clone());
    match settings.registry_credentials() {
        Some(credentials) => runner = runner.with_credentials(credentials),
        None => warn!("DOCKER_USERNAME/DOCKER_PASSWORD not set; pushing with the local Docker login"),
    }
    if let Some(timeout) = settings.pipeline_timeout() {
        runner = runner.with_timeout(timeout);
    }
    let pipeline: Arc<dyn ImagePipeline> = Arc::new(runner);

    let ledger: Arc<dyn TokenLedger> = match settings.ledger_backend {
        LedgerBackend::Chain => {
            let config = settings.ledger_config()?;
            Arc::new(
                EthersLedger::connect(&config)
                    .await
                    .map_err(|e| anyhow!("failed to connect token ledger: {}", e))?,
            )
        }
        LedgerBackend::Memory => {
            warn!("Using the in-memory ledger; rewards are not minted on chain");
            Arc::new(RecordingLedger::new())
        }
    };

    let sessions = SessionTokens::new(settings.jwt_secret.as_bytes(), settings.session_ttl());
    if !settings.require_session {
        warn!("Session tokens are not required on job endpoints");
    }

    let coordinator = Arc::new(JobCoordinator::new(
        store,
        pipeline,
        ledger,
        Arc::new(SysinfoProvider),
        sessions,
        settings.coordinator_config(),
    ));

    let state = AppState::new(coordinator, settings.require_session);
    let shutdown = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
    };

    start_server(state, settings.socket_addr(), shutdown)
        .await
        .map_err(|e| anyhow!("server error: {}", e))?;

    Ok(())
}
