// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance and verification for the cluster services.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to the issuer's `/login`
//! 2. Issuer checks the credential table and signs `{sub, exp}` with the
//!    shared secret, returning the token in the body and an HttpOnly cookie
//! 3. Client calls a resource service with `Authorization: Bearer <token>`
//!    or the `access_token` cookie
//! 4. The resource service's `Auth` extractor verifies signature, algorithm
//!    and expiry and hands the claims to the handler
//!
//! ## Security
//!
//! - The signing secret and the credential table are the trust root
//! - Only HMAC algorithms are accepted, fixed by configuration
//! - No clock skew leeway: a token is expired once `now >= exp`
//! - Tokens are never stored server-side

pub mod claims;
pub mod codec;
pub mod cookie;
pub mod credentials;
pub mod error;
pub mod extractor;

pub use claims::{AuthenticatedUser, Claims};
pub use codec::TokenCodec;
pub use cookie::{CookiePolicy, ACCESS_TOKEN_COOKIE};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use extractor::{authenticate, Auth, Verification};
