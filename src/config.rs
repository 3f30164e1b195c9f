// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! immutable [`Config`] built from them at startup. Every component receives
//! its settings from a `Config` value; nothing reads the environment after
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SECRET_KEY` | Shared token signing secret | Required |
//! | `ALGORITHM` | Token signing algorithm (`HS256`, `HS384`, `HS512`) | `HS256` |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | Token lifetime in minutes | `30` |
//! | `DOWNSTREAM_URL` | URL called by `/read-downstream` | `http://downstream-service` |
//! | `DOWNSTREAM_TIMEOUT_SECS` | Outbound call timeout | `5` |
//! | `ALLOWED_ORIGINS` | Comma separated CORS origins | `http://localhost:8003` |
//! | `ENV` | `development` or `production` | `development` |
//! | `SERVICE_ROLE` | `issuer`, `gateway` or `downstream` | `gateway` |
//! | `AUTH_USERS` | Credential table as `name:password,...` | Demo users |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::credentials::{CredentialError, CredentialStore};

/// Environment variable holding the token signing secret.
///
/// There is no default. Every service in the cluster must be started with
/// the same value or tokens minted by the issuer will be rejected.
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

/// Environment variable selecting the HMAC signing algorithm.
pub const ALGORITHM_ENV: &str = "ALGORITHM";

/// Environment variable holding the token lifetime in minutes.
pub const TOKEN_TTL_MINUTES_ENV: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";

/// Environment variable holding the downstream service URL.
pub const DOWNSTREAM_URL_ENV: &str = "DOWNSTREAM_URL";

/// Environment variable holding the outbound call timeout in seconds.
pub const DOWNSTREAM_TIMEOUT_ENV: &str = "DOWNSTREAM_TIMEOUT_SECS";

/// Environment variable holding the comma separated CORS origin list.
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Environment variable selecting development or production behaviour.
///
/// Production turns on the `Secure` cookie attribute and disables `.env`
/// file loading.
pub const ENVIRONMENT_ENV: &str = "ENV";

/// Environment variable selecting which routes this process serves.
pub const SERVICE_ROLE_ENV: &str = "SERVICE_ROLE";

/// Environment variable overriding the credential table.
pub const AUTH_USERS_ENV: &str = "AUTH_USERS";

/// Server bind address.
pub const HOST_ENV: &str = "HOST";

/// Server bind port.
pub const PORT_ENV: &str = "PORT";

/// Logging output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;
pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 30;
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://downstream-service";
pub const DEFAULT_DOWNSTREAM_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8003";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration errors raised while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build credential table: {0}")]
    Credentials(#[from] CredentialError),

    #[error("failed to build downstream HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl fmt::Display) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl Environment {
    /// Read `ENV` leniently, before logging and `.env` loading are set up.
    pub fn from_process_env() -> Self {
        std::env::var(ENVIRONMENT_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// Which route set a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceRole {
    /// Login/logout and token minting.
    Issuer,
    /// Token-guarded greeting, downstream call and CPU burn.
    #[default]
    Gateway,
    /// Plain service called by the gateway.
    Downstream,
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "issuer" | "auth" => Ok(ServiceRole::Issuer),
            "gateway" => Ok(ServiceRole::Gateway),
            "downstream" => Ok(ServiceRole::Downstream),
            other => Err(format!("unknown service role '{other}'")),
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRole::Issuer => write!(f, "issuer"),
            ServiceRole::Gateway => write!(f, "gateway"),
            ServiceRole::Downstream => write!(f, "downstream"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_process_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Immutable process configuration.
#[derive(Clone)]
pub struct Config {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub token_ttl: Duration,
    pub downstream_url: Url,
    pub downstream_timeout: Duration,
    pub allowed_origins: Vec<String>,
    pub environment: Environment,
    pub role: ServiceRole,
    pub credentials: CredentialStore,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .field("downstream_url", &self.downstream_url.as_str())
            .field("downstream_timeout", &self.downstream_timeout)
            .field("allowed_origins", &self.allowed_origins)
            .field("environment", &self.environment)
            .field("role", &self.role)
            .field("credentials", &self.credentials)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup(SECRET_KEY_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(SECRET_KEY_ENV))?;

        let algorithm = match lookup(ALGORITHM_ENV) {
            Some(raw) => parse_algorithm(&raw)?,
            None => DEFAULT_ALGORITHM,
        };

        let ttl_minutes = parse_or(&lookup, TOKEN_TTL_MINUTES_ENV, DEFAULT_TOKEN_TTL_MINUTES)?;
        if ttl_minutes == 0 {
            return Err(ConfigError::invalid(TOKEN_TTL_MINUTES_ENV, "must be positive"));
        }
        let ttl_secs = ttl_minutes
            .checked_mul(60)
            .ok_or_else(|| ConfigError::invalid(TOKEN_TTL_MINUTES_ENV, "too large"))?;

        let downstream_raw =
            lookup(DOWNSTREAM_URL_ENV).unwrap_or_else(|| DEFAULT_DOWNSTREAM_URL.to_string());
        let downstream_url = Url::parse(&downstream_raw)
            .map_err(|e| ConfigError::invalid(DOWNSTREAM_URL_ENV, e))?;
        if !matches!(downstream_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                DOWNSTREAM_URL_ENV,
                "scheme must be http or https",
            ));
        }

        let timeout_secs = parse_or(&lookup, DOWNSTREAM_TIMEOUT_ENV, DEFAULT_DOWNSTREAM_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::invalid(DOWNSTREAM_TIMEOUT_ENV, "must be positive"));
        }

        let allowed_origins = split_origins(
            &lookup(ALLOWED_ORIGINS_ENV).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let environment = match lookup(ENVIRONMENT_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(ENVIRONMENT_ENV, e))?,
            None => Environment::default(),
        };

        let role = match lookup(SERVICE_ROLE_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(SERVICE_ROLE_ENV, e))?,
            None => ServiceRole::default(),
        };

        let credentials = match lookup(AUTH_USERS_ENV) {
            Some(raw) => CredentialStore::from_entries(parse_user_table(&raw)?)?,
            None => CredentialStore::demo()?,
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;

        Ok(Self {
            secret_key,
            algorithm,
            token_ttl: Duration::from_secs(ttl_secs),
            downstream_url,
            downstream_timeout: Duration::from_secs(timeout_secs),
            allowed_origins,
            environment,
            role,
            credentials,
            host,
            port,
        })
    }

    /// Whether the access token cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm =
        Algorithm::from_str(raw.trim()).map_err(|e| ConfigError::invalid(ALGORITHM_ENV, e))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::invalid(
            ALGORITHM_ENV,
            format!("{other:?} is not a shared-secret algorithm"),
        )),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::invalid(name, e)),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_user_table(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((user, password)) if !user.is_empty() && !password.is_empty() => {
                Ok((user.to_string(), password.to_string()))
            }
            _ => Err(ConfigError::invalid(
                AUTH_USERS_ENV,
                "entries must look like name:password",
            )),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(secret: &str, role: ServiceRole) -> Config {
    let secret = secret.to_string();
    let role = role.to_string();
    Config::from_lookup(move |name| match name {
        SECRET_KEY_ENV => Some(secret.clone()),
        SERVICE_ROLE_ENV => Some(role.clone()),
        _ => None,
    })
    .expect("test config is valid")
}
