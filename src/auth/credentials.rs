// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed credential table checked at login.
//!
//! Passwords are never kept in memory after the table is built. Each entry
//! stores a random per-user salt and `HMAC-SHA256(salt, password)`; checks
//! recompute the digest and compare it in constant time.

use std::collections::HashMap;
use std::fmt;

use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Demo accounts served when `AUTH_USERS` is not set.
pub const DEMO_USERS: [(&str, &str); 4] = [
    ("user", "pass"),
    ("alice", "wonderland"),
    ("bob", "builder"),
    ("charlie", "chocolate"),
];

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to generate password salt")]
    SaltGeneration,

    #[error("failed to key password digest")]
    DigestKey,
}

#[derive(Clone)]
struct StoredCredential {
    salt: [u8; SALT_LEN],
    digest: Vec<u8>,
}

/// Username to salted password digest table.
#[derive(Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, StoredCredential>,
}

impl CredentialStore {
    /// Build the store with the demo accounts.
    pub fn demo() -> Result<Self, CredentialError> {
        Self::from_entries(DEMO_USERS)
    }

    /// Build the store from `(username, password)` pairs.
    ///
    /// A later entry for the same username replaces an earlier one.
    pub fn from_entries<I, U, P>(entries: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: AsRef<str>,
    {
        let rng = SystemRandom::new();
        let mut table = HashMap::new();

        for (username, password) in entries {
            let mut salt = [0u8; SALT_LEN];
            rng.fill(&mut salt)
                .map_err(|_| CredentialError::SaltGeneration)?;
            let digest = digest(&salt, password.as_ref())?;
            table.insert(username.into(), StoredCredential { salt, digest });
        }

        Ok(Self { entries: table })
    }

    /// Check a username/password pair against the table.
    pub fn check(&self, username: &str, password: &str) -> bool {
        match self.entries.get(username) {
            Some(stored) => verify(&stored.salt, password, &stored.digest),
            None => {
                // Unknown users still pay for one MAC.
                let _ = verify(&[0u8; SALT_LEN], password, &[]);
                false
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn verify(salt: &[u8], password: &str, expected: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(salt) else {
        return false;
    };
    mac.update(password.as_bytes());
    mac.verify_slice(expected).is_ok()
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut users: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        users.sort_unstable();
        f.debug_struct("CredentialStore")
            .field("users", &users)
            .finish()
    }
}

fn digest(salt: &[u8], password: &str) -> Result<Vec<u8>, CredentialError> {
    let mut mac = HmacSha256::new_from_slice(salt).map_err(|_| CredentialError::DigestKey)?;
    mac.update(password.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
