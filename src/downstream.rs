// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound calls from a verified request to the downstream service.
//!
//! One GET per call with a bounded timeout and no retry. Failures are
//! classified so the caller can decide on its own retry policy:
//!
//! | Failure | Status | Message prefix |
//! |---------|--------|----------------|
//! | Timeout | 504 | `timeout:` |
//! | Connection / transport | 502 | `request error:` |
//! | Anything else | 500 | `unexpected error:` |

use std::error::Error as _;
use std::time::{Duration, Instant};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::Client;
use serde_json::Value;
use tracing::{instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::observability::metrics::record_downstream_call;

#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("request error: {0}")]
    Connection(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DownstreamError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DownstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DownstreamError::Connection(_) => StatusCode::BAD_GATEWAY,
            DownstreamError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            DownstreamError::Timeout(_) => "timeout",
            DownstreamError::Connection(_) => "connection_error",
            DownstreamError::Unexpected(_) => "unexpected_error",
        }
    }
}

impl From<reqwest::Error> for DownstreamError {
    fn from(err: reqwest::Error) -> Self {
        let detail = error_chain(&err);
        if err.is_timeout() {
            DownstreamError::Timeout(detail)
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
            DownstreamError::Connection(detail)
        } else {
            DownstreamError::Unexpected(detail)
        }
    }
}

impl IntoResponse for DownstreamError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Downstream call failed");
        ApiError::new(self.status_code(), self.to_string()).into_response()
    }
}

/// Render an error with its source chain, e.g.
/// `error sending request for url (...): client error (Connect): Connection refused`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !detail.contains(&text) {
            detail.push_str(": ");
            detail.push_str(&text);
        }
        source = cause.source();
    }
    detail
}

/// HTTP client bound to the downstream service URL.
#[derive(Clone, Debug)]
pub struct DownstreamClient {
    http: Client,
    url: Url,
}

impl DownstreamClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { http, url })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.downstream_url.clone(), config.downstream_timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the downstream URL and decode its JSON body.
    ///
    /// The body is decoded whatever the downstream status; non-success
    /// statuses are logged.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn call(&self) -> Result<Value, DownstreamError> {
        let start = Instant::now();
        let result = self.fetch().await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        record_downstream_call(outcome, start.elapsed());
        result
    }

    async fn fetch(&self) -> Result<Value, DownstreamError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Downstream returned non-success status");
        }
        Ok(response.json::<Value>().await?)
    }
}
