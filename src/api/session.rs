// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, Claims},
    models::{LoginRequest, MessageResponse, TokenResponse},
    observability::metrics::record_login,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, description = "Token issued and access_token cookie set", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    if !state
        .config
        .credentials
        .check(&request.username, &request.password)
    {
        warn!(username = %request.username, "Login rejected");
        record_login("invalid_credentials");
        return Err(AuthError::InvalidCredentials);
    }

    let token = state
        .codec
        .issue(&Claims::for_subject(request.username.as_str()))
        .inspect_err(|_| record_login("error"))?;

    info!(username = %request.username, "Issued access token");
    record_login("success");

    let jar = state.cookies.issue(jar, &token);
    Ok((jar, Json(TokenResponse::bearer(token))))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Session",
    responses((status = 200, description = "access_token cookie cleared", body = MessageResponse))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        state.cookies.clear(jar),
        Json(MessageResponse::new("Logged out successfully")),
    )
}
