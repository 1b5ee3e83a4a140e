// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Header authentication errors.

use axum::response::{IntoResponse, Response};

use crate::{
    error::ApiError,
    validation::{self, ValidationError},
};

/// Why a request's credentials were refused before anything was forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `authorization` header on a route that needs a session.
    #[error("authorization header is required")]
    MissingAuthorization,
    /// Header present but not visible ASCII.
    #[error("header {0} is not valid text")]
    InvalidHeader(&'static str),
}

impl AuthError {
    pub fn validation_error(&self) -> ValidationError {
        match self {
            AuthError::MissingAuthorization => validation::MISSING_AUTHORIZATION,
            AuthError::InvalidHeader(_) => ValidationError::unauthorized(
                "INVALID_AUTHORIZATION",
                "인증 정보가 올바르지 않습니다.",
            ),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        error.validation_error().into()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn missing_authorization_renders_envelope() {
        let response = AuthError::MissingAuthorization.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["status"], "401");
        assert_eq!(body["code"], "MISSING_AUTHORIZATION");
        assert_eq!(body["message"], "로그인이 필요합니다.");
    }

    #[test]
    fn invalid_header_is_unauthorized() {
        let error = ApiError::from(AuthError::InvalidHeader("walletaddress"));
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.code, "INVALID_AUTHORIZATION");
    }
}
