// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod password;
pub mod session;

pub use password::{generate_password, PasswordHasher};
pub use session::{SessionClaims, SessionError, SessionTokens, DEFAULT_SESSION_TTL};

use axum::http::{header, HeaderMap};

/// Header the volunteer client sends its session token in.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Session token from `x-access-token`, falling back to `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
