// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Backend that actions and routes are proxied to.
    pub backend: String,
    /// WalletConnect project id. Only checked in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walletconnect: Option<String>,
    /// HTTPS termination. Only checked in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<String>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn status_of(ok: bool, failure: &str) -> String {
    if ok { "ok" } else { failure }.to_string()
}

/// A production deployment must not proxy to a loopback backend.
fn check_backend(config: &AppConfig) -> String {
    let loopback = matches!(
        config.api_server_url.host_str(),
        Some("localhost" | "127.0.0.1" | "[::1]")
    );
    status_of(!(loopback && config.environment.is_production()), "local")
}

fn check_production(config: &AppConfig) -> (Option<String>, Option<String>) {
    if !config.environment.is_production() {
        return (None, None);
    }
    (
        Some(status_of(config.walletconnect_project_id.is_some(), "missing")),
        Some(status_of(config.tls.is_some(), "disabled")),
    )
}

fn report(config: &AppConfig) -> (StatusCode, Json<ReadyResponse>) {
    let backend = check_backend(config);
    let (walletconnect, tls) = check_production(config);

    let all_ok = [Some(&backend), walletconnect.as_ref(), tls.as_ref()]
        .into_iter()
        .flatten()
        .all(|s| s == "ok");

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            backend,
            walletconnect,
            tls,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    report(&state.config)
}

/// Liveness probe handler. Always 200 while the process runs.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
