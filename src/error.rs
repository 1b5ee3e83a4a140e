// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{models::ActionMessage, validation::ValidationError};

pub const API_ERROR: &str = "API_ERROR";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

pub const NETWORK_ERROR_MESSAGE: &str = "네트워크 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
pub const INTERNAL_ERROR_MESSAGE: &str = "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Failure half of the envelope. Renders as
/// `{isSuccess: false, status, code, message, result}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub result: Option<Value>,
}

/// Fields recovered from a backend error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendErrorBody {
    pub code: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub remaining_attempts: Option<u64>,
}

impl BackendErrorBody {
    /// Parse leniently: an empty or non-JSON body yields all `None`.
    pub fn parse(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            code: non_empty_str(&value, "code"),
            error: non_empty_str(&value, "error"),
            message: non_empty_str(&value, "message"),
            remaining_attempts: value.get("remainingAttempts").and_then(Value::as_u64),
        }
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Transport or decoding failure on a server action.
    pub fn network() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, NETWORK_ERROR, NETWORK_ERROR_MESSAGE)
    }

    /// Transport or decoding failure on a route handler.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE,
        )
    }

    /// Map a non-OK backend reply. `code` falls back to `API_ERROR`, the
    /// message to `error`, then `message`, then `fallback`.
    pub fn from_backend(status: StatusCode, body: &BackendErrorBody, fallback: &str) -> Self {
        Self::new(
            status,
            body.code.clone().unwrap_or_else(|| API_ERROR.to_string()),
            body.error
                .clone()
                .or_else(|| body.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
        )
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::new(error.status, error.code, error.message)
    }
}

impl From<ApiError> for ActionMessage {
    fn from(error: ApiError) -> Self {
        ActionMessage {
            result: error.result,
            ..ActionMessage::failure(error.status, error.code, error.message)
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ActionMessage::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    #[test]
    fn backend_code_and_message_pass_through() {
        let body = BackendErrorBody::parse(br#"{"code":"X","message":"Y"}"#);
        let err = ApiError::from_backend(StatusCode::CONFLICT, &body, "fallback");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "X");
        assert_eq!(err.message, "Y");
    }

    #[test]
    fn empty_or_garbled_body_falls_back() {
        for raw in [&b""[..], b"<html>bad gateway</html>", br#"{"code":""}"#] {
            let body = BackendErrorBody::parse(raw);
            let err = ApiError::from_backend(StatusCode::BAD_GATEWAY, &body, "기본 메시지");
            assert_eq!(err.code, API_ERROR);
            assert_eq!(err.message, "기본 메시지");
        }
    }

    #[test]
    fn error_field_wins_over_message() {
        let body = BackendErrorBody::parse(
            br#"{"error":"Invalid code","message":"Bad Request","remainingAttempts":2}"#,
        );
        assert_eq!(body.remaining_attempts, Some(2));
        let err = ApiError::from_backend(StatusCode::BAD_REQUEST, &body, "fallback");
        assert_eq!(err.message, "Invalid code");
    }

    #[tokio::test]
    async fn into_response_renders_envelope() {
        let response = ApiError::network()
            .with_result(json!({"remainingAttempts": 1}))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "isSuccess": false,
                "status": "500",
                "code": "NETWORK_ERROR",
                "message": NETWORK_ERROR_MESSAGE,
                "result": {"remainingAttempts": 1}
            })
        );
    }
}
