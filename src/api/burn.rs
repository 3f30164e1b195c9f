// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::Query, Json};
use tracing::{debug, error};

use crate::{
    error::ApiError,
    load,
    models::{BurnQuery, BurnResponse},
};

/// Burn CPU for load testing.
///
/// Unauthenticated. The hash chain runs on the blocking pool.
#[utoipa::path(
    get,
    path = "/burn",
    params(BurnQuery),
    tag = "Gateway",
    responses(
        (status = 200, body = BurnResponse),
        (status = 400, description = "iterations is not an integer")
    )
)]
pub async fn burn_cpu(Query(query): Query<BurnQuery>) -> Result<Json<BurnResponse>, ApiError> {
    let rounds = query.rounds();
    debug!(iterations = query.iterations, rounds, "Burning CPU");

    let digest = tokio::task::spawn_blocking(move || load::burn(rounds))
        .await
        .map_err(|e| {
            error!(error = %e, "Burn task failed");
            ApiError::internal("Internal Server Error")
        })?;

    Ok(Json(BurnResponse { digest }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burn_returns_digest() {
        let Json(body) = burn_cpu(Query(BurnQuery { iterations: 1 })).await.unwrap();
        assert_eq!(
            body.digest,
            "49abd65bbf7f7e40c7055093ed2e3fd75f2f602f2c5fcf955c213e3135eb03f7"
        );
    }

    #[tokio::test]
    async fn negative_iterations_run_zero_rounds() {
        let Json(body) = burn_cpu(Query(BurnQuery { iterations: -1 })).await.unwrap();
        assert_eq!(body.digest, "");
    }

    #[tokio::test]
    async fn zero_iterations_returns_empty_digest() {
        let Json(body) = burn_cpu(Query(BurnQuery { iterations: 0 })).await.unwrap();
        assert_eq!(body.digest, "");
    }
}
