// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prometheus metrics.
//!
//! All metrics use the `cluster_auth_` prefix, `_total` for counters and
//! `_seconds` for duration histograms.
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: the fixed route set, anything else is `/other`
//! - `status`: success, error, timeout
//! - `outcome`: fixed per metric (see the recording functions)

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return the handle `/metrics` renders.
///
/// Must be called once, before any metric is recorded.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("cluster_auth_http_request".to_string()),
            &[0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500],
        )?
        .set_buckets_for_metric(
            Matcher::Prefix("cluster_auth_downstream_request".to_string()),
            &[0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000],
        )?
        .install_recorder()
}

/// Record a completed HTTP request.
///
/// Metric: `cluster_auth_http_requests_total`, `cluster_auth_http_request_duration_seconds`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);

    histogram!("cluster_auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status" => categorize_status_code(status_code)
    )
    .record(duration.as_secs_f64());

    counter!("cluster_auth_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Record a token check.
///
/// Metric: `cluster_auth_token_verifications_total`
/// Outcomes: accepted, missing_token, token_expired, invalid_token
pub fn record_token_verification(outcome: &'static str) {
    counter!("cluster_auth_token_verifications_total", "outcome" => outcome).increment(1);
}

/// Record a login attempt.
///
/// Metric: `cluster_auth_logins_total`
/// Outcomes: success, invalid_credentials, error
pub fn record_login(outcome: &'static str) {
    counter!("cluster_auth_logins_total", "outcome" => outcome).increment(1);
}

/// Record an outbound downstream call.
///
/// Metric: `cluster_auth_downstream_requests_total`, `cluster_auth_downstream_request_duration_seconds`
/// Outcomes: success, timeout, connection_error, unexpected_error
pub fn record_downstream_call(outcome: &'static str, duration: Duration) {
    histogram!("cluster_auth_downstream_request_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
    counter!("cluster_auth_downstream_requests_total", "outcome" => outcome).increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/login" => "/login",
        "/logout" => "/logout",
        "/read-downstream" => "/read-downstream",
        "/burn" => "/burn",
        "/healthz" => "/healthz",
        "/metrics" => "/metrics",
        "/api-doc/openapi.json" => "/api-doc/openapi.json",
        p if p.starts_with("/docs") => "/docs",
        _ => "/other",
    }
}
