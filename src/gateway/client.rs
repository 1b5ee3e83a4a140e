// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! HTTP client for the API Gateway.
//!
//! Wallet-authenticated calls carry a lower-cased `walletaddress` header and,
//! when one could be produced, the Web3Token in `authorization`.

use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderValue, Method, StatusCode},
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{ApiError, BackendErrorBody},
    models::{GuardianRegistrationRequest, RegistrationResponse},
    session::StoreError,
};

pub const WALLET_ADDRESS_HEADER: &str = "walletaddress";

pub const SEND_CODE_FAILED: &str = "인증 코드 발송에 실패했습니다.";
pub const VERIFY_CODE_FAILED: &str = "인증 코드 검증에 실패했습니다.";
pub const GUARDIAN_REGISTRATION_FAILED: &str = "보호자 등록에 실패했습니다.";
pub const GUARDIAN_PROFILE_FAILED: &str = "보호자 프로필 조회에 실패했습니다.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}")]
    Status {
        status: StatusCode,
        body: BackendErrorBody,
    },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("Session expired, sign in again at {redirect_to}")]
    SessionExpired { redirect_to: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GatewayError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message: the backend's `error`, then `message`, then
    /// `fallback` for backend failures; the error itself otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            GatewayError::Status { body, .. } => body
                .error
                .clone()
                .or_else(|| body.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
            other => other.to_string(),
        }
    }

    /// Envelope form. Non-backend failures map through `on_failure`.
    pub fn into_api_error(self, fallback: &str, on_failure: fn() -> ApiError) -> ApiError {
        match self {
            GatewayError::Status { status, body } => ApiError::from_backend(status, &body, fallback),
            _ => on_failure(),
        }
    }
}

/// `walletaddress` / `authorization` pair for wallet-authenticated calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletHeaders {
    pub wallet_address: Option<String>,
    pub authorization: Option<String>,
}

impl WalletHeaders {
    pub fn new(wallet_address: &str, web3_token: Option<String>) -> Self {
        Self {
            wallet_address: Some(wallet_address.trim().to_ascii_lowercase()),
            authorization: web3_token.filter(|t| !t.is_empty()),
        }
    }

    /// Only an `authorization` value, forwarded verbatim.
    pub fn authorization(value: Option<String>) -> Self {
        Self {
            wallet_address: None,
            authorization: value.filter(|t| !t.is_empty()),
        }
    }
}

/// A multipart field description. Rebuildable, so requests can be retried.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    Json {
        name: String,
        value: Value,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Bytes,
    },
}

impl MultipartField {
    fn into_part(self) -> Result<(String, Part), GatewayError> {
        Ok(match self {
            MultipartField::Text { name, value } => (name, Part::text(value)),
            MultipartField::Json { name, value } => {
                let part = Part::text(serde_json::to_string(&value)?)
                    .mime_str("application/json")?;
                (name, part)
            }
            MultipartField::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                (name, part)
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: WalletHeaders,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: WalletHeaders::default(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn headers(mut self, headers: WalletHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }
}

/// Raw backend reply; status is not yet interpreted.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The body as JSON, `null` when empty.
    pub fn json_value(&self) -> Result<Value, GatewayError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        self.json()
    }

    pub fn error_body(&self) -> BackendErrorBody {
        BackendErrorBody::parse(&self.body)
    }

    /// Turn a non-2xx reply into [`GatewayError::Status`].
    pub fn into_result(self) -> Result<Self, GatewayError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::Status {
                status: self.status,
                body: self.error_body(),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `path` to the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| GatewayError::Endpoint(format!("{}: {}", raw, e)))
    }

    pub async fn send(&self, request: BackendRequest) -> Result<BackendReply, GatewayError> {
        let url = self.endpoint(&request.path)?;
        debug!(method = %request.method, path = %request.path, "Calling backend");

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(wallet) = &request.headers.wallet_address {
            builder = builder.header(WALLET_ADDRESS_HEADER, wallet);
        }
        if let Some(authorization) = &request.headers.authorization {
            if HeaderValue::from_str(authorization).is_ok() {
                builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
            } else {
                warn!("Dropping authorization value that is not a valid header");
            }
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => {
                let mut form = Form::new();
                for field in fields {
                    let (name, part) = field.into_part()?;
                    form = form.part(name, part);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(path = %request.path, status = status.as_u16(), "Backend replied");

        Ok(BackendReply { status, body })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: BackendRequest,
    ) -> Result<T, GatewayError> {
        self.send(request).await?.into_result()?.json()
    }

    pub async fn send_verification_code(
        &self,
        email: &str,
        headers: WalletHeaders,
    ) -> Result<Value, GatewayError> {
        let request = BackendRequest::post("/email/send-code")
            .headers(headers)
            .json(json!({ "email": email.trim() }));
        self.send(request).await?.into_result()?.json_value()
    }

    pub async fn verify_email_code(
        &self,
        code: &str,
        headers: WalletHeaders,
    ) -> Result<Value, GatewayError> {
        let request = BackendRequest::post("/email/verify-code")
            .headers(headers)
            .json(json!({ "code": code.trim() }));
        self.send(request).await?.into_result()?.json_value()
    }

    pub async fn register_guardian(
        &self,
        registration: &GuardianRegistrationRequest,
        headers: WalletHeaders,
    ) -> Result<RegistrationResponse, GatewayError> {
        let request = BackendRequest::post("/api/guardian/register")
            .headers(headers)
            .json(serde_json::to_value(registration)?);
        self.send_json(request).await
    }

    pub async fn guardian_profile(
        &self,
        guardian_address: &str,
        headers: WalletHeaders,
    ) -> Result<Value, GatewayError> {
        let request = BackendRequest::get("/api/guardian/profile")
            .query("address", guardian_address)
            .headers(headers);
        self.send(request).await?.into_result()?.json_value()
    }

    /// Any failure counts as not registered.
    pub async fn is_guardian_registered(
        &self,
        guardian_address: &str,
        headers: WalletHeaders,
    ) -> bool {
        let request = BackendRequest::get("/api/guardian/check")
            .query("address", guardian_address)
            .headers(headers);

        match self.send_json::<Value>(request).await {
            Ok(body) => body
                .get("isRegistered")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            Err(error) => {
                warn!(%error, "Guardian registration check failed");
                false
            }
        }
    }
}
