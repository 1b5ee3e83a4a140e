// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Forwarding and reply normalisation shared by every action and route.
//!
//! A backend reply ends up as an [`ActionMessage`]:
//!
//! - 2xx with an envelope body (`isSuccess` present): relayed as-is
//! - 2xx with any other body: wrapped under `result` with code `SUCCESS`
//! - non-2xx: mapped through [`ProxyPolicy::reject`]
//! - transport or decoding failure: `NETWORK_ERROR` for actions,
//!   `INTERNAL_SERVER_ERROR` for routes

use axum::http::StatusCode;
use serde_json::Value;
use tracing::error;

use crate::{
    error::{ApiError, BackendErrorBody},
    gateway::{BackendRequest, GatewayClient},
    models::ActionMessage,
};

pub const SUCCESS_MESSAGE: &str = "요청에 성공하였습니다.";
pub const UNAUTHORIZED_MESSAGE: &str = "인증이 만료되었습니다. 다시 로그인해주세요.";
pub const FORBIDDEN_MESSAGE: &str = "접근 권한이 없습니다.";

/// How one endpoint reports failures.
#[derive(Debug, Clone, Copy)]
pub struct ProxyPolicy {
    pub fallback: &'static str,
    on_failure: fn() -> ApiError,
    not_found: Option<(&'static str, &'static str)>,
    session: bool,
}

impl ProxyPolicy {
    /// Server action: uncaught failures become `NETWORK_ERROR`.
    pub fn action(fallback: &'static str) -> Self {
        Self {
            fallback,
            on_failure: ApiError::network,
            not_found: None,
            session: false,
        }
    }

    /// Route handler: uncaught failures become `INTERNAL_SERVER_ERROR`.
    pub fn route(fallback: &'static str) -> Self {
        Self {
            on_failure: ApiError::internal,
            ..Self::action(fallback)
        }
    }

    /// Replace a backend 404 with a fixed code and message.
    pub fn not_found(self, code: &'static str, message: &'static str) -> Self {
        Self {
            not_found: Some((code, message)),
            ..self
        }
    }

    /// Backend 401/403 become `UNAUTHORIZED`/`FORBIDDEN`.
    pub fn session(self) -> Self {
        Self {
            session: true,
            ..self
        }
    }

    pub fn failure(&self) -> ApiError {
        (self.on_failure)()
    }

    pub fn reject(&self, status: StatusCode, body: &BackendErrorBody) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED if self.session => {
                ApiError::new(status, "UNAUTHORIZED", UNAUTHORIZED_MESSAGE)
            }
            StatusCode::FORBIDDEN if self.session => {
                ApiError::new(status, "FORBIDDEN", FORBIDDEN_MESSAGE)
            }
            StatusCode::NOT_FOUND => match self.not_found {
                Some((code, message)) => ApiError::new(status, code, message),
                None => ApiError::from_backend(status, body, self.fallback),
            },
            _ => ApiError::from_backend(status, body, self.fallback),
        }
    }
}

/// Send `request` and return the backend's 2xx body.
pub async fn forward_raw(
    gateway: &GatewayClient,
    request: BackendRequest,
    policy: &ProxyPolicy,
) -> Result<Value, ApiError> {
    let path = request.path.clone();
    let reply = gateway.send(request).await.map_err(|e| {
        error!(error = %e, %path, "Backend call failed");
        policy.failure()
    })?;

    if !reply.is_success() {
        return Err(policy.reject(reply.status, &reply.error_body()));
    }

    reply.json_value().map_err(|e| {
        error!(error = %e, %path, "Backend reply was not JSON");
        policy.failure()
    })
}

/// Send `request` and normalise the reply into an envelope.
pub async fn forward(
    gateway: &GatewayClient,
    request: BackendRequest,
    policy: ProxyPolicy,
) -> Result<ActionMessage, ApiError> {
    forward_raw(gateway, request, &policy).await.map(envelope)
}

/// Relay an envelope body; wrap anything else as a success.
pub fn envelope(body: Value) -> ActionMessage {
    let Some(is_success) = body.get("isSuccess").and_then(Value::as_bool) else {
        return ActionMessage::success(SUCCESS_MESSAGE, Some(body));
    };

    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    let status = match body.get("status") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ if is_success => StatusCode::OK.as_u16().to_string(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.as_u16().to_string(),
    };

    ActionMessage {
        is_success,
        status,
        code: text("code").unwrap_or_else(|| if is_success { "SUCCESS" } else { "API_ERROR" }.into()),
        message: text("message").unwrap_or_default(),
        result: body.get("result").cloned().filter(|r| !r.is_null()),
    }
}
