// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the volunteer training coordinator

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "volunteer-registration",
    "session-tokens",
    "docker-pipeline",
    "status-transitions",
    "token-rewards",
    "idempotent-completion",
    "firestore-store",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Volunteer Trainer {}", VERSION_NUMBER)
}
