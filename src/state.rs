// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CookiePolicy, TokenCodec};
use crate::config::{Config, ConfigError};
use crate::downstream::DownstreamClient;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub codec: Arc<TokenCodec>,
    pub cookies: CookiePolicy,
    pub downstream: DownstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let codec = TokenCodec::from_config(&config);
        let cookies = CookiePolicy::from_config(&config);
        let downstream = DownstreamClient::from_config(&config)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
            cookies,
            downstream,
        })
    }
}
