// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token cookie.
//!
//! Login and logout build the cookie from the same policy so the removal
//! cookie matches the one the browser stored (HttpOnly, SameSite=Strict,
//! Path=/, Secure in production).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::Config;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.cookie_secure(),
        }
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((ACCESS_TOKEN_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .path("/")
            .build()
    }

    /// Add the access token cookie to `jar`.
    pub fn issue(&self, jar: CookieJar, token: &str) -> CookieJar {
        jar.add(self.build(token.to_string()))
    }

    /// Add a removal cookie to `jar`.
    ///
    /// Emitted whether or not the request carried the cookie, so logout is
    /// idempotent.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = self.build(String::new());
        cookie.make_removal();
        jar.add(cookie)
    }
}
