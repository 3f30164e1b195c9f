// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    downstream::DownstreamError,
    models::{DownstreamResponse, MessageResponse},
    state::AppState,
};

pub const GATEWAY_MESSAGE: &str = "Hello from the gateway service";
pub const DOWNSTREAM_MESSAGE: &str = "Hello from the downstream service";

#[utoipa::path(
    get,
    path = "/",
    tag = "Gateway",
    responses(
        (status = 200, description = "Greeting for the token subject", body = MessageResponse),
        (status = 401, description = "Missing, expired or invalid token")
    )
)]
pub async fn greet(Auth(user): Auth) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "Hello from Kubernetes, {}!",
        user.subject
    )))
}

#[utoipa::path(
    get,
    path = "/read-downstream",
    tag = "Gateway",
    responses(
        (status = 200, body = DownstreamResponse),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 500, description = "Unexpected downstream failure"),
        (status = 502, description = "Downstream unreachable"),
        (status = 504, description = "Downstream timed out")
    )
)]
pub async fn read_downstream(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<DownstreamResponse>, DownstreamError> {
    tracing::debug!(subject = %user.subject, "Calling downstream");
    let payload = state.downstream.call().await?;
    Ok(Json(DownstreamResponse {
        message: GATEWAY_MESSAGE.to_string(),
        downstream_response: payload,
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Downstream",
    responses((status = 200, body = MessageResponse))
)]
pub async fn downstream_root() -> Json<MessageResponse> {
    Json(MessageResponse::new(DOWNSTREAM_MESSAGE))
}
