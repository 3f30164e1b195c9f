// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cluster Auth - token issuing and verification for a small service mesh
//!
//! One binary serves one of three roles, selected by `SERVICE_ROLE`:
//! the issuer (login/logout), the gateway (token-guarded resources, the
//! downstream call and the CPU burn endpoint) and the downstream service.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, routing and the request pipeline (Axum)
//! - `auth` - Credentials, token codec, cookies and the `Auth` extractor
//! - `config` - Environment configuration
//! - `downstream` - Outbound calls to the downstream service
//! - `load` - Synthetic CPU load
//! - `observability` - Tracing and Prometheus metrics

pub mod api;
pub mod auth;
pub mod config;
pub mod downstream;
pub mod error;
pub mod load;
pub mod models;
pub mod observability;
pub mod state;
