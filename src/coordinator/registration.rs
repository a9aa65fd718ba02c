// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::Utc;
use tracing::{info, warn};

use super::error::{CoordinatorError, CoordinatorResult};
use super::{validation, JobCoordinator};
use crate::auth::{generate_password, PasswordHasher};
use crate::host::SystemDetails;
use crate::ledger::generate_wallet;
use crate::records::{LoginRecord, Volunteer};

#[derive(Debug, Clone)]
pub struct NewVolunteer {
    pub name: String,
    pub email: String,
}

/// Credentials handed back once at registration. Nothing here is recoverable later.
#[derive(Clone)]
pub struct RegisteredVolunteer {
    pub id: String,
    pub ethereum_address: String,
    pub private_key: String,
    pub password: String,
}

impl std::fmt::Debug for RegisteredVolunteer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredVolunteer")
            .field("id", &self.id)
            .field("ethereum_address", &self.ethereum_address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub volunteer_id: String,
    pub system_info: SystemDetails,
}

impl JobCoordinator {
    /// Create a volunteer with a fresh wallet and generated password.
    ///
    /// Emails are not checked for uniqueness.
    pub async fn register_volunteer(&self, input: NewVolunteer) -> CoordinatorResult<RegisteredVolunteer> {
        let name = validation::require("name", &input.name)?.to_string();
        let email = validation::email(&input.email)?.to_string();

        let wallet = generate_wallet();
        let password = generate_password();
        let hasher = self.config.password_hasher;
        let plain = password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| CoordinatorError::Internal(format!("password hashing failed: {}", e)))?;

        let volunteer = Volunteer {
            name,
            email,
            ethereum_address: wallet.address.clone(),
            password_hash: Some(password_hash),
            tasks_completed: 0,
        };
        let id = self.records.create_volunteer(&volunteer).await?;
        info!(volunteer_id = %id, address = %wallet.address, "Registered volunteer");

        Ok(RegisteredVolunteer {
            id,
            ethereum_address: wallet.address,
            private_key: wallet.private_key,
            password,
        })
    }

    /// Check credentials, issue a session token and record the login.
    pub async fn login(&self, email: &str, password: &str) -> CoordinatorResult<LoginOutcome> {
        let email = validation::email(email)?;
        if password.is_empty() {
            return Err(CoordinatorError::validation("password", "password is required"));
        }

        let volunteer = self
            .records
            .volunteer_by_email(email)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound("Volunteer".to_string()))?;

        let Some(stored_hash) = volunteer.record.password_hash.clone() else {
            warn!(volunteer_id = %volunteer.id, "Login attempt for volunteer without a password");
            return Err(CoordinatorError::Unauthorized("Invalid password".to_string()));
        };
        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || PasswordHasher::verify(&stored_hash, &candidate))
            .await
            .map_err(|e| CoordinatorError::Internal(format!("password check failed: {}", e)))?;
        if !matches {
            warn!(volunteer_id = %volunteer.id, "Rejected login with wrong password");
            return Err(CoordinatorError::Unauthorized("Invalid password".to_string()));
        }

        let token = self.sessions.issue(&volunteer.id)?;
        let system_info = self.system_info.collect().await?;

        self.records
            .append_login(&LoginRecord {
                volunteer_id: volunteer.id.clone(),
                login_time: Utc::now(),
                system_info: system_info.clone(),
            })
            .await?;
        info!(volunteer_id = %volunteer.id, "Volunteer logged in");

        Ok(LoginOutcome {
            token,
            volunteer_id: volunteer.id,
            system_info,
        })
    }
}
