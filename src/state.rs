// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use std::sync::Arc;

use crate::{
    config::AppConfig,
    gateway::{GatewayClient, GatewayError},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Client for the backend that actions and routes are proxied to.
    pub gateway: GatewayClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, GatewayError> {
        let gateway = GatewayClient::new(config.api_server_url.clone(), config.http_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            gateway,
        })
    }
}
