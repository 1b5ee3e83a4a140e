// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `API_SERVER_URL` | Backend base URL used by the proxy | `http://localhost:3000` |
//! | `API_GATEWAY_URL` | Base URL for Bearer-authenticated clients | `API_SERVER_URL` |
//! | `BESU_RPC_URL` | Besu JSON-RPC endpoint | `http://localhost:8545` |
//! | `BESU_CHAIN_ID` | Besu chain id | `1337` |
//! | `BESU_EXPLORER_URL` | Block explorer | `http://localhost:4000` |
//! | `WALLETCONNECT_PROJECT_ID` | WalletConnect project id | Optional |
//! | `APP_ENV` | `production` or development | `development` |
//! | `HTTP_TIMEOUT_SECS` | Outbound HTTP timeout | `30` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! The `NEXT_PUBLIC_*` names used by the web frontend are accepted as
//! fallbacks so both deployments can share one `.env` file.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use url::Url;

use crate::web3::NetworkConfig;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const API_SERVER_URL_ENV: &str = "API_SERVER_URL";
pub const PUBLIC_API_SERVER_URL_ENV: &str = "NEXT_PUBLIC_API_SERVER_URL";
pub const API_GATEWAY_URL_ENV: &str = "API_GATEWAY_URL";
pub const PUBLIC_API_GATEWAY_URL_ENV: &str = "NEXT_PUBLIC_API_GATEWAY_URL";
pub const BESU_RPC_URL_ENV: &str = "BESU_RPC_URL";
pub const PUBLIC_BESU_RPC_URL_ENV: &str = "NEXT_PUBLIC_BESU_RPC_URL";
pub const BESU_CHAIN_ID_ENV: &str = "BESU_CHAIN_ID";
pub const BESU_EXPLORER_URL_ENV: &str = "BESU_EXPLORER_URL";
pub const WALLETCONNECT_PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";
pub const PUBLIC_WALLETCONNECT_PROJECT_ID_ENV: &str = "NEXT_PUBLIC_WALLETCONNECT_PROJECT_ID";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const HTTP_TIMEOUT_SECS_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_SERVER_URL: &str = "http://localhost:3000";
const DEFAULT_BESU_RPC_URL: &str = "http://localhost:8545";
const DEFAULT_BESU_CHAIN_ID: u64 = 1337;
const DEFAULT_BESU_EXPLORER_URL: &str = "http://localhost:4000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("{0} must be set together with {1}")]
    IncompleteTls(&'static str, &'static str),
}

/// Deployment mode. Production expects a Web3Token on every wallet call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("production") | Some("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Backend base URL used when proxying server actions and route handlers.
    pub api_server_url: Url,
    /// Base URL for Bearer-authenticated client calls.
    pub api_gateway_url: Url,
    pub network: NetworkConfig,
    pub walletconnect_project_id: Option<String>,
    pub environment: Environment,
    pub http_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Empty and whitespace-only values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let first = |names: &[&str]| names.iter().find_map(|name| get(name));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_number(PORT_ENV, get(PORT_ENV), DEFAULT_PORT)?;

        let api_server_raw = first(&[API_SERVER_URL_ENV, PUBLIC_API_SERVER_URL_ENV])
            .unwrap_or_else(|| DEFAULT_API_SERVER_URL.to_string());
        let api_server_url = parse_url(API_SERVER_URL_ENV, &api_server_raw)?;

        let api_gateway_url = match first(&[API_GATEWAY_URL_ENV, PUBLIC_API_GATEWAY_URL_ENV]) {
            Some(raw) => parse_url(API_GATEWAY_URL_ENV, &raw)?,
            None => api_server_url.clone(),
        };

        let rpc_raw = first(&[BESU_RPC_URL_ENV, PUBLIC_BESU_RPC_URL_ENV])
            .unwrap_or_else(|| DEFAULT_BESU_RPC_URL.to_string());
        let rpc_url = parse_url(BESU_RPC_URL_ENV, &rpc_raw)?;
        let explorer_raw =
            get(BESU_EXPLORER_URL_ENV).unwrap_or_else(|| DEFAULT_BESU_EXPLORER_URL.to_string());
        let explorer_url = parse_url(BESU_EXPLORER_URL_ENV, &explorer_raw)?;
        let chain_id = parse_number(BESU_CHAIN_ID_ENV, get(BESU_CHAIN_ID_ENV), DEFAULT_BESU_CHAIN_ID)?;

        let http_timeout_secs = parse_number(
            HTTP_TIMEOUT_SECS_ENV,
            get(HTTP_TIMEOUT_SECS_ENV),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::IncompleteTls(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::IncompleteTls(TLS_KEY_PATH_ENV, TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            host,
            port,
            api_server_url,
            api_gateway_url,
            network: NetworkConfig::besu(chain_id, rpc_url, explorer_url),
            walletconnect_project_id: first(&[
                WALLETCONNECT_PROJECT_ID_ENV,
                PUBLIC_WALLETCONNECT_PROJECT_ID_ENV,
            ]),
            environment: Environment::parse(get(APP_ENV_ENV)),
            http_timeout: Duration::from_secs(http_timeout_secs),
            tls,
            log_format: LogFormat::parse(get(LOG_FORMAT_ENV)),
        })
    }

    /// Configuration pointing both base URLs at `backend`, everything else default.
    pub fn with_backend(backend: &str) -> Result<Self, ConfigError> {
        let backend = backend.to_string();
        Self::from_lookup(move |name| (name == API_SERVER_URL_ENV).then(|| backend.clone()))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(format!("{}:{}", self.host, self.port)))
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_server_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.api_gateway_url, config.api_server_url);
        assert_eq!(config.network.chain_id, 1337);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.tls.is_none());
    }

    #[test]
    fn public_names_are_accepted_as_fallbacks() {
        let config = config_from(&[
            (PUBLIC_API_SERVER_URL_ENV, "https://api.dogcatpaw.example"),
            (PUBLIC_BESU_RPC_URL_ENV, "http://besu.example:8545"),
            (PUBLIC_WALLETCONNECT_PROJECT_ID_ENV, "project-123"),
        ])
        .unwrap();
        assert_eq!(config.api_server_url.host_str(), Some("api.dogcatpaw.example"));
        assert_eq!(config.network.rpc_url.host_str(), Some("besu.example"));
        assert_eq!(config.walletconnect_project_id.as_deref(), Some("project-123"));
    }

    #[test]
    fn server_side_name_wins_over_public_name() {
        let config = config_from(&[
            (API_SERVER_URL_ENV, "http://internal:9000"),
            (PUBLIC_API_SERVER_URL_ENV, "https://public.example"),
        ])
        .unwrap();
        assert_eq!(config.api_server_url.host_str(), Some("internal"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[(PORT_ENV, "eighty")]),
            Err(ConfigError::InvalidNumber { name: PORT_ENV, .. })
        ));
        assert!(matches!(
            config_from(&[(API_SERVER_URL_ENV, "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            config_from(&[(TLS_CERT_PATH_ENV, "/certs/server.pem")]),
            Err(ConfigError::IncompleteTls(..))
        ));
    }

    #[test]
    fn production_and_json_logging_are_parsed() {
        let config = config_from(&[(APP_ENV_ENV, "Production"), (LOG_FORMAT_ENV, "JSON")]).unwrap();
        assert!(config.environment.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn with_backend_points_both_urls_at_backend() {
        let config = AppConfig::with_backend("http://127.0.0.1:4010").unwrap();
        assert_eq!(config.api_server_url.as_str(), "http://127.0.0.1:4010/");
        assert_eq!(config.api_gateway_url.as_str(), "http://127.0.0.1:4010/");
        assert!(config.bind_addr().is_ok());
    }
}
