// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Bearer-authenticated gateway calls for a logged-in session.
//!
//! The access token is read from storage for every request. A 401 triggers
//! exactly one reissue with the stored refresh token followed by one retry;
//! if that fails the stored tokens are dropped and the caller gets
//! [`GatewayError::SessionExpired`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::{BackendReply, BackendRequest, GatewayClient, GatewayError};
use crate::{
    models::{AuthResponse, ReissueResponse, User},
    session::{AuthService, KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};

/// Where a client is sent once its session cannot be refreshed.
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone)]
pub struct BearerClient {
    gateway: GatewayClient,
    store: Arc<dyn KeyValueStore>,
}

impl BearerClient {
    pub fn new(gateway: GatewayClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self { gateway, store }
    }

    /// Send with the stored access token, refreshing once on 401.
    pub async fn send(&self, request: BackendRequest) -> Result<BackendReply, GatewayError> {
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        let reply = self.gateway.send(request.clone().bearer(token)).await?;
        if reply.status != StatusCode::UNAUTHORIZED {
            return Ok(reply);
        }

        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY)? else {
            return Ok(reply);
        };

        let access_token = match self.reissue(&refresh_token).await {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "Token reissue failed");
                return Err(self.expire_session()?);
            }
        };
        self.store.set(ACCESS_TOKEN_KEY, &access_token)?;
        info!("Access token reissued, retrying request");

        let retried = self.gateway.send(request.bearer(Some(access_token))).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            return Err(self.expire_session()?);
        }
        Ok(retried)
    }

    fn expire_session(&self) -> Result<GatewayError, GatewayError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        Ok(GatewayError::SessionExpired {
            redirect_to: LOGIN_PATH,
        })
    }

    /// Exchange a refresh token. Sent without the interceptor logic.
    pub async fn reissue(&self, refresh_token: &str) -> Result<String, GatewayError> {
        let request = BackendRequest::post("/api/auth/reissue")
            .json(json!({ "refreshToken": refresh_token }));
        let reply: ReissueResponse = self.gateway.send(request).await?.into_result()?.json()?;
        Ok(reply.access_token)
    }

    pub async fn get<T: DeserializeOwned>(&self, request: BackendRequest) -> Result<T, GatewayError> {
        self.send(request).await?.into_result()?.json()
    }

    /// Like [`BearerClient::get`] for endpoints whose body may be empty.
    pub async fn call(&self, request: BackendRequest) -> Result<Value, GatewayError> {
        self.send(request).await?.into_result()?.json_value()
    }

    pub async fn current_user(&self, wallet_address: &str) -> Result<User, GatewayError> {
        self.get(BackendRequest::get(format!("/api/users/{}", wallet_address)))
            .await
    }

    pub async fn login_with_vp(
        &self,
        wallet_address: &str,
        vp_jwt: &str,
    ) -> Result<AuthResponse, GatewayError> {
        self.get(
            BackendRequest::post("/api/auth/login")
                .json(json!({ "walletAddress": wallet_address, "vpJwt": vp_jwt })),
        )
        .await
    }

    /// Backend logout. Stored tokens are removed whatever the outcome.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let result = self.call(BackendRequest::post("/api/auth/logout")).await;
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        result.map(|_| ())
    }
}

#[async_trait]
impl AuthService for BearerClient {
    async fn current_user(&self, wallet_address: &str) -> Result<User, GatewayError> {
        BearerClient::current_user(self, wallet_address).await
    }

    async fn login_with_vp(
        &self,
        wallet_address: &str,
        vp_jwt: &str,
    ) -> Result<AuthResponse, GatewayError> {
        BearerClient::login_with_vp(self, wallet_address, vp_jwt).await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        BearerClient::logout(self).await
    }
}
