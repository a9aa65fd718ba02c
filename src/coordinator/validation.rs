// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Input checks shared by the coordinator operations.

use ethers::types::Address;
use url::Url;

use super::error::{CoordinatorError, CoordinatorResult};
use crate::jobs::TrainingStatus;
use crate::ledger::parse_address;

pub const MAX_DOC_ID_LEN: usize = 128;
pub const MAX_FIELD_LEN: usize = 256;

pub fn require<'a>(field: &str, value: &'a str) -> CoordinatorResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoordinatorError::validation(field, format!("{} is required", field)));
    }
    if trimmed.len() > MAX_FIELD_LEN {
        return Err(CoordinatorError::validation(
            field,
            format!("{} must be at most {} characters", field, MAX_FIELD_LEN),
        ));
    }
    Ok(trimmed)
}

/// Identifiers handed to the build (model and dataset ids): no whitespace or control characters.
pub fn identifier<'a>(field: &str, value: &'a str) -> CoordinatorResult<&'a str> {
    let value = require(field, value)?;
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoordinatorError::validation(
            field,
            format!("{} must not contain whitespace", field),
        ));
    }
    Ok(value)
}

/// Id of an existing job document. Looser than [`doc_id`] so jobs created
/// by other clients can still be read; only path separators and control
/// characters are refused.
pub fn doc_ref(value: &str) -> CoordinatorResult<&str> {
    if value.is_empty() {
        return Err(CoordinatorError::validation("docId", "docId is required"));
    }
    if value.len() > MAX_DOC_ID_LEN {
        return Err(CoordinatorError::validation(
            "docId",
            format!("docId must be at most {} characters", MAX_DOC_ID_LEN),
        ));
    }
    if value.contains('/') || value.chars().any(char::is_control) {
        return Err(CoordinatorError::validation(
            "docId",
            "docId may not contain '/' or control characters",
        ));
    }
    Ok(value)
}

/// Job document ids end up in image tags, so only `[A-Za-z0-9_.-]` is allowed.
pub fn doc_id(value: &str) -> CoordinatorResult<&str> {
    if value.is_empty() {
        return Err(CoordinatorError::validation("docId", "docId is required"));
    }
    if value.len() > MAX_DOC_ID_LEN {
        return Err(CoordinatorError::validation(
            "docId",
            format!("docId must be at most {} characters", MAX_DOC_ID_LEN),
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(CoordinatorError::validation(
            "docId",
            "docId may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(value)
}

pub fn email(value: &str) -> CoordinatorResult<&str> {
    let value = require("email", value)?;
    let mut parts = value.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !value.chars().any(char::is_whitespace)
        }
        _ => false,
    };
    if !valid {
        return Err(CoordinatorError::validation("email", "email is not a valid address"));
    }
    Ok(value)
}

pub fn status(field: &str, value: &str) -> CoordinatorResult<TrainingStatus> {
    value
        .parse()
        .map_err(|e: crate::jobs::UnknownStatus| CoordinatorError::validation(field, e.to_string()))
}

pub fn absolute_url(field: &str, value: &str) -> CoordinatorResult<Url> {
    let value = require(field, value)?;
    Url::parse(value).map_err(|e| {
        CoordinatorError::validation(field, format!("{} must be an absolute URL: {}", field, e))
    })
}

pub fn address(field: &str, value: &str) -> CoordinatorResult<Address> {
    parse_address(value.trim()).map_err(|_| {
        CoordinatorError::validation(
            field,
            format!("{} must be a 0x-prefixed 20-byte hex address", field),
        )
    })
}
