// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed, time-bound token encoding and verification.
//!
//! Tokens are compact JWS strings signed with a shared HMAC secret. The
//! codec is pure: no I/O, and the only ambient input is the clock, which
//! the `*_at` variants take explicitly.
//!
//! ## Verification order
//!
//! 1. Structure, header algorithm and signature (any failure is
//!    [`AuthError::InvalidToken`])
//! 2. `exp` must be present and a non-negative integer
//!    ([`AuthError::InvalidToken`])
//! 3. `now >= exp` is [`AuthError::ExpiredToken`]

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{AuthError, Claims};
use crate::config::Config;

/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Issues and verifies tokens for one secret/algorithm pair.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec for an HMAC `algorithm` keyed with `secret`.
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            default_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.secret_key.as_bytes(), config.algorithm).with_default_ttl(config.token_ttl)
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign `claims` with the default lifetime.
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        self.issue_with_ttl(claims, self.default_ttl)
    }

    pub fn issue_with_ttl(&self, claims: &Claims, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Sign a copy of `claims` stamped with `exp = now + ttl`.
    ///
    /// Any `exp` already present in `claims` is replaced.
    pub fn issue_at(
        &self,
        claims: &Claims,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let stamped = claims
            .clone()
            .with_expiry(now.timestamp().saturating_add(ttl_secs));

        encode(&Header::new(self.algorithm), &stamped, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            },
        )?;

        let claims = data.claims;
        let exp = claims
            .expires_at()
            .filter(|exp| *exp >= 0)
            .ok_or(AuthError::InvalidToken)?;
        if now.timestamp() >= exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        // Expiry is checked against the caller's instant in verify_at.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}
