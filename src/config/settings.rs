// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::{ArgAction, Parser, ValueEnum};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::auth::PasswordHasher;
use crate::container::{RegistryCredentials, Secret};
use crate::coordinator::CoordinatorConfig;
use crate::ledger::LedgerConfig;
use crate::store::firestore::auth::{ServiceAccount, DEFAULT_TOKEN_URI};
use crate::store::FirestoreConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Process memory; lost on restart
    Memory,
    Firestore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerBackend {
    /// JSON-RPC chain through the reward token contract
    Chain,
    /// Record mints in memory only
    Memory,
}

/// Coordinator settings, read from flags or the environment (`.env` is loaded first).
#[derive(Parser, Clone)]
#[command(name = "volunteer-trainer")]
#[command(version)]
#[command(about = "Coordinator for volunteer machine-learning training jobs", long_about = None)]
pub struct Settings {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// HMAC secret for session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Require a session token on job endpoints
    #[arg(long, env = "REQUIRE_SESSION", default_value_t = true, action = ArgAction::Set)]
    pub require_session: bool,

    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = 86_400)]
    pub session_ttl_secs: u64,

    // Container registry and trainer image

    #[arg(long, env = "DOCKER_USERNAME")]
    pub docker_username: Option<String>,

    #[arg(long, env = "DOCKER_PASSWORD", hide_env_values = true)]
    pub docker_password: Option<String>,

    /// Registry host; Docker Hub when unset
    #[arg(long, env = "DOCKER_REGISTRY")]
    pub docker_registry: Option<String>,

    #[arg(long, env = "DOCKER_BIN", default_value = "docker")]
    pub docker_bin: String,

    #[arg(long, env = "TRAINER_DOCKERFILE", default_value = "./Trainer/Dockerfile")]
    pub trainer_dockerfile: PathBuf,

    #[arg(long, env = "TRAINER_CONTEXT", default_value = "./Trainer")]
    pub trainer_context: PathBuf,

    /// Upper bound on one login/build/push run, 0 for none
    #[arg(long, env = "PIPELINE_TIMEOUT_SECS", default_value_t = 1_800)]
    pub pipeline_timeout_secs: u64,

    // Chain

    #[arg(long, env = "LEDGER_BACKEND", value_enum, default_value_t = LedgerBackend::Chain)]
    pub ledger_backend: LedgerBackend,

    #[arg(long, env = "GANACHE_URL", default_value = "http://127.0.0.1:7545")]
    pub ganache_url: String,

    /// Key of the account allowed to mint rewards
    #[arg(long, env = "GANACHE_PRIVATE_KEY", hide_env_values = true)]
    pub ganache_private_key: Option<String>,

    /// Reward token contract; falls back to CONTRACT_ADDRESS
    #[arg(long, env = "GANACHE_CONTRACT_ADDRESS")]
    pub ganache_contract_address: Option<String>,

    /// Queried from the node when unset
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    #[arg(long, env = "LEDGER_CONFIRMATIONS", default_value_t = 1)]
    pub ledger_confirmations: usize,

    /// Send pre-EIP-1559 transactions
    #[arg(long, env = "LEGACY_TRANSACTIONS", default_value_t = true, action = ArgAction::Set)]
    pub legacy_transactions: bool,

    // Passed to the trainer image as build args

    #[arg(long, env = "CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,

    /// JSON ABI string
    #[arg(long, env = "CONTRACT_ABI")]
    pub contract_abi: Option<String>,

    #[arg(long, env = "ACCOUNT_ADDRESS")]
    pub account_address: Option<String>,

    // Rewards

    #[arg(long, env = "REWARD_TOKENS", default_value_t = crate::coordinator::DEFAULT_REWARD_TOKENS)]
    pub reward_tokens: u64,

    /// Reject completing an already completed job
    #[arg(long, env = "IDEMPOTENT_COMPLETION", default_value_t = true, action = ArgAction::Set)]
    pub idempotent_completion: bool,

    // Document store

    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Memory)]
    pub store_backend: StoreBackend,

    #[arg(long, env = "FIREBASE_PROJECT_ID")]
    pub firebase_project_id: Option<String>,

    #[arg(long, env = "FIREBASE_CLIENT_EMAIL")]
    pub firebase_client_email: Option<String>,

    #[arg(long, env = "FIREBASE_PRIVATE_KEY", hide_env_values = true)]
    pub firebase_private_key: Option<String>,

    #[arg(long, env = "FIREBASE_TOKEN_URI", default_value = DEFAULT_TOKEN_URI)]
    pub firebase_token_uri: String,

    /// `host:port` of a Firestore emulator; disables OAuth
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST")]
    pub firestore_emulator_host: Option<String>,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn pipeline_timeout(&self) -> Option<Duration> {
        (self.pipeline_timeout_secs > 0).then(|| Duration::from_secs(self.pipeline_timeout_secs))
    }

    /// Login credentials, when both user name and password are set.
    pub fn registry_credentials(&self) -> Option<RegistryCredentials> {
        match (&self.docker_username, &self.docker_password) {
            (Some(username), Some(password)) => Some(RegistryCredentials {
                username: username.clone(),
                password: Secret::new(password.clone()),
                registry: self.docker_registry.clone(),
            }),
            _ => None,
        }
    }

    /// Where trainer images are pushed: `[registry/]username`.
    pub fn registry_namespace(&self) -> String {
        let user = self.docker_username.as_deref().unwrap_or("volunteer");
        match &self.docker_registry {
            Some(registry) => format!("{}/{}", registry.trim_end_matches('/'), user),
            None => user.to_string(),
        }
    }

    /// Chain settings baked into every trainer image.
    pub fn build_args(&self) -> BTreeMap<String, String> {
        let mut args = BTreeMap::new();
        args.insert("GANACHE_URL".to_string(), self.ganache_url.clone());
        let optional = [
            ("CONTRACT_ADDRESS", &self.contract_address),
            ("CONTRACT_ABI", &self.contract_abi),
            ("ACCOUNT_ADDRESS", &self.account_address),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                args.insert(name.to_string(), value.clone());
            }
        }
        args
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            registry_namespace: self.registry_namespace(),
            dockerfile: self.trainer_dockerfile.clone(),
            context: self.trainer_context.clone(),
            build_args: self.build_args(),
            reward_tokens: self.reward_tokens,
            idempotent_completion: self.idempotent_completion,
            password_hasher: PasswordHasher::default(),
        }
    }

    pub fn ledger_config(&self) -> Result<LedgerConfig, ConfigError> {
        let private_key = self
            .ganache_private_key
            .clone()
            .ok_or(ConfigError::Missing("GANACHE_PRIVATE_KEY"))?;
        let contract_address = self
            .ganache_contract_address
            .clone()
            .or_else(|| self.contract_address.clone())
            .ok_or(ConfigError::Missing("GANACHE_CONTRACT_ADDRESS"))?;

        Ok(LedgerConfig {
            rpc_url: self.ganache_url.clone(),
            private_key,
            contract_address,
            chain_id: self.chain_id,
            confirmations: self.ledger_confirmations,
            legacy: self.legacy_transactions,
        })
    }

    pub fn firestore_config(&self) -> Result<FirestoreConfig, ConfigError> {
        let project_id = self
            .firebase_project_id
            .clone()
            .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?;
        let mut config = FirestoreConfig::new(project_id);
        config.emulator_host = self.firestore_emulator_host.clone();

        if config.emulator_host.is_none() {
            let client_email = self
                .firebase_client_email
                .clone()
                .ok_or(ConfigError::Missing("FIREBASE_CLIENT_EMAIL"))?;
            let private_key = self
                .firebase_private_key
                .clone()
                .ok_or(ConfigError::Missing("FIREBASE_PRIVATE_KEY"))?;
            config.service_account = Some(ServiceAccount {
                client_email,
                private_key,
                token_uri: self.firebase_token_uri.clone(),
            });
        }
        Ok(config)
    }
}
