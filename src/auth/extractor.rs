// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification guard for protected handlers.
//!
//! Use the `Auth` extractor in handlers to require a valid token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.subject is the caller's identity
//! }
//! ```
//!
//! ## Token lookup
//!
//! 1. `Authorization: Bearer <token>` header
//! 2. `access_token` cookie, only when the header is absent or uses
//!    another scheme
//!
//! The header always wins. The two sources are never merged or compared.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use super::{cookie::ACCESS_TOKEN_COOKIE, AuthError, AuthenticatedUser, TokenCodec};
use crate::observability::metrics::record_token_verification;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of checking one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Authenticated(AuthenticatedUser),
    Rejected(AuthError),
}

impl Verification {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Verification::Authenticated(_))
    }

    pub fn into_result(self) -> Result<AuthenticatedUser, AuthError> {
        match self {
            Verification::Authenticated(user) => Ok(user),
            Verification::Rejected(reason) => Err(reason),
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            Verification::Authenticated(_) => "accepted",
            Verification::Rejected(reason) => reason.error_code(),
        }
    }
}

/// Find the token a request presents, header first.
///
/// Returns `None` when there is no token or the chosen source is empty.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token.to_string()).filter(|t| !t.is_empty());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|t| !t.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix(BEARER_PREFIX)?;
    Some(rest.split(' ').next().unwrap_or(rest))
}

/// Check the token presented in `headers`.
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Verification {
    let verification = match extract_token(headers) {
        None => Verification::Rejected(AuthError::MissingToken),
        Some(token) => match codec.verify(&token) {
            Ok(claims) => Verification::Authenticated(AuthenticatedUser::from_claims(claims)),
            Err(reason) => Verification::Rejected(reason),
        },
    };
    record_token_verification(verification.outcome());
    verification
}

/// Extractor for authenticated callers.
///
/// Rejects the request with the verifier's [`AuthError`] before the
/// handler runs.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authenticate(&parts.headers, &state.codec) {
            Verification::Authenticated(user) => Ok(Auth(user)),
            Verification::Rejected(reason) => {
                tracing::debug!(path = %parts.uri.path(), %reason, "Rejected request");
                Err(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::config::{test_config, ServiceRole};
    use axum::http::{header::COOKIE, HeaderValue, Request};
    use jsonwebtoken::Algorithm;

    const SECRET: &str = "extractor-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET.as_bytes(), Algorithm::HS256)
    }

    fn token_for(subject: &str) -> String {
        codec().issue(&Claims::for_subject(subject)).unwrap()
    }

    fn headers(pairs: &[(axum::http::HeaderName, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn no_header_no_cookie_is_missing() {
        let result = authenticate(&HeaderMap::new(), &codec());
        assert_eq!(result, Verification::Rejected(AuthError::MissingToken));
    }

    #[test]
    fn bearer_header_authenticates() {
        let h = headers(&[(AUTHORIZATION, format!("Bearer {}", token_for("Hitagi")))]);
        let user = authenticate(&h, &codec()).into_result().unwrap();
        assert_eq!(user.subject, "Hitagi");
    }

    #[test]
    fn cookie_is_used_without_header() {
        let h = headers(&[(COOKIE, format!("theme=dark; access_token={}", token_for("Mayoi")))]);
        let user = authenticate(&h, &codec()).into_result().unwrap();
        assert_eq!(user.subject, "Mayoi");
    }

    #[test]
    fn header_wins_over_invalid_cookie() {
        let h = headers(&[
            (AUTHORIZATION, format!("Bearer {}", token_for("header-user"))),
            (COOKIE, "access_token=garbage".to_string()),
        ]);
        let user = authenticate(&h, &codec()).into_result().unwrap();
        assert_eq!(user.subject, "header-user");
    }

    #[test]
    fn invalid_header_is_not_rescued_by_valid_cookie() {
        let h = headers(&[
            (AUTHORIZATION, "Bearer garbage".to_string()),
            (COOKIE, format!("access_token={}", token_for("cookie-user"))),
        ]);
        assert_eq!(
            authenticate(&h, &codec()),
            Verification::Rejected(AuthError::InvalidToken)
        );
    }

    #[test]
    fn non_bearer_scheme_falls_back_to_cookie() {
        let h = headers(&[
            (AUTHORIZATION, "Basic dXNlcjpwYXNz".to_string()),
            (COOKIE, format!("access_token={}", token_for("cookie-user"))),
        ]);
        let user = authenticate(&h, &codec()).into_result().unwrap();
        assert_eq!(user.subject, "cookie-user");
    }

    #[test]
    fn empty_bearer_is_missing() {
        let h = headers(&[(AUTHORIZATION, "Bearer ".to_string())]);
        assert_eq!(
            authenticate(&h, &codec()),
            Verification::Rejected(AuthError::MissingToken)
        );
    }

    #[test]
    fn expired_token_is_reported() {
        let token = codec()
            .issue_at(
                &Claims::for_subject("old"),
                std::time::Duration::from_secs(60),
                chrono::Utc::now() - chrono::Duration::hours(2),
            )
            .unwrap();
        let h = headers(&[(AUTHORIZATION, format!("Bearer {token}"))]);
        assert_eq!(
            authenticate(&h, &codec()),
            Verification::Rejected(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn missing_sub_yields_unknown_user() {
        let token = codec().issue(&Claims::new().with("role", "viewer")).unwrap();
        let h = headers(&[(AUTHORIZATION, format!("Bearer {token}"))]);
        let user = authenticate(&h, &codec()).into_result().unwrap();
        assert_eq!(user.subject, crate::auth::claims::UNKNOWN_SUBJECT);
    }

    #[tokio::test]
    async fn extractor_uses_state_codec() {
        let state = AppState::new(test_config(SECRET, ServiceRole::Gateway)).unwrap();
        let token = state.codec.issue(&Claims::for_subject("Koyomi")).unwrap();
        let mut parts = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.subject, "Koyomi");
    }

    #[tokio::test]
    async fn extractor_rejects_without_token() {
        let state = AppState::new(test_config(SECRET, ServiceRole::Gateway)).unwrap();
        let mut parts = Request::builder().uri("/").body(()).unwrap().into_parts().0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }
}
