// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use std::{process::ExitCode, time::Duration};

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use dogcatpaw_server::{
    api::router,
    config::{AppConfig, ConfigError, TlsPaths},
    gateway::GatewayError,
    logging::initialize_logging,
    state::AppState,
};

/// Time in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("gateway client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("TLS certificate: {0}")]
    Tls(std::io::Error),

    #[error("server: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; the configured format is unknown.
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    initialize_logging(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let addr = config.bind_addr()?;
    let tls = config.tls.clone();
    let environment = config.environment;

    let state = AppState::new(config)?;
    info!(backend = %state.config.api_server_url, ?environment, "Proxy configured");

    let app = with_request_layers(router(state));

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if shutdown_signal().await {
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
        }
    });

    match tls {
        Some(paths) => {
            let tls_config = load_tls(&paths).await?;
            info!(%addr, cert = %paths.cert.display(), "DogCatPaw server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
        None => {
            if environment.is_production() {
                warn!("TLS_CERT_PATH/TLS_KEY_PATH unset; serving plain HTTP in production");
            }
            info!(%addr, "DogCatPaw server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
    }
}

async fn load_tls(paths: &TlsPaths) -> Result<RustlsConfig, StartupError> {
    // Must happen before any rustls config is built.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(StartupError::Tls)
}

/// Tag every request with `x-request-id` and trace it.
fn with_request_layers(app: Router) -> Router {
    app.layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Resolves on Ctrl-C. `false` when the signal handler could not be installed.
async fn shutdown_signal() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown requested; draining connections");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            false
        }
    }
}
