// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for every role's routes. All types derive
//! `ToSchema` for the OpenAPI documents served at `/docs`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::load::DEFAULT_BURN_ITERATIONS;

// =============================================================================
// Session
// =============================================================================

/// Body of `POST /login`.
#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `GET /read-downstream`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownstreamResponse {
    pub message: String,
    /// JSON body returned by the downstream service, passed through as-is.
    #[schema(value_type = Object)]
    pub downstream_response: Value,
}

// =============================================================================
// Load generation
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
pub struct BurnQuery {
    /// Hash chain length. Negative counts run zero rounds.
    #[serde(default = "default_burn_iterations")]
    pub iterations: i64,
}

impl BurnQuery {
    /// Rounds to run, clamped into `0..=u32::MAX`.
    pub fn rounds(&self) -> u32 {
        u32::try_from(self.iterations.max(0)).unwrap_or(u32::MAX)
    }
}

fn default_burn_iterations() -> i64 {
    i64::from(DEFAULT_BURN_ITERATIONS)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BurnResponse {
    /// Hex SHA-256 digest of the final round.
    pub digest: String,
}

// =============================================================================
// Operations
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
