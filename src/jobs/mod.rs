// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod status;

pub use status::{TrainingStatus, UnknownStatus};

/// Image tag for a training job: `<namespace>/training_job_<doc id>`, lowercased
/// because registries reject upper-case repository names.
pub fn image_tag(namespace: &str, doc_id: &str) -> String {
    format!("{}/training_job_{}", namespace, doc_id).to_lowercase()
}
