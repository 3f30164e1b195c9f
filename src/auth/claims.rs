// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated caller representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Subject claim key.
pub const SUBJECT_CLAIM: &str = "sub";

/// Expiry claim key (Unix seconds).
pub const EXPIRY_CLAIM: &str = "exp";

/// Identity reported when a verified token carries no `sub` claim.
pub const UNKNOWN_SUBJECT: &str = "unknown user";

/// Claims carried inside a token.
///
/// An ordered mapping of claim names to JSON values. Tokens minted by the
/// issuer always contain `sub` and `exp`; other keys pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims identifying `subject`.
    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self::new().with(SUBJECT_CLAIM, subject.into())
    }

    /// Add or replace a claim.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `sub` claim, if present and a string.
    pub fn subject(&self) -> Option<&str> {
        self.0.get(SUBJECT_CLAIM).and_then(Value::as_str)
    }

    /// The `exp` claim, if present and an integer.
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(EXPIRY_CLAIM).and_then(Value::as_i64)
    }

    pub(crate) fn with_expiry(self, exp: i64) -> Self {
        self.with(EXPIRY_CLAIM, exp)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Caller identity established by a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The `sub` claim, or [`UNKNOWN_SUBJECT`] when absent.
    pub subject: String,
    /// Full verified claims.
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        let subject = claims.subject().unwrap_or(UNKNOWN_SUBJECT).to_string();
        Self { subject, claims }
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.claims.expires_at()
    }
}
