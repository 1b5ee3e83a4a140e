// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Axum extractors for the two credential conventions.
//!
//! - [`WalletAuth`]: `walletaddress` plus an optional `authorization`
//!   Web3Token, used by the wallet-authenticated actions
//! - [`BearerAuth`]: a required `authorization` header, forwarded verbatim
//!   to the backend
//!
//! ```rust,ignore
//! async fn my_pets(BearerAuth(authorization): BearerAuth) -> ActionMessage {
//!     // forward `authorization` as-is
//! }
//! ```
//!
//! Neither extractor verifies the token. The API Gateway owns that decision.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::AuthError;
use crate::gateway::{WalletHeaders, WALLET_ADDRESS_HEADER};

fn header_text(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, AuthError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let text = value.to_str().map_err(|_| AuthError::InvalidHeader(name))?;
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
    }
}

/// Wallet credentials from the request headers. Both halves are optional
/// here; handlers decide which are required and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletAuth {
    pub wallet_address: Option<String>,
    pub web3_token: Option<String>,
}

impl WalletAuth {
    /// Prefer values submitted with the form, falling back to headers.
    pub fn merge(self, wallet_address: Option<&str>, web3_token: Option<&str>) -> Self {
        let pick = |form: Option<&str>, header: Option<String>| {
            form.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or(header)
        };
        Self {
            wallet_address: pick(wallet_address, self.wallet_address),
            web3_token: pick(web3_token, self.web3_token),
        }
    }

    pub fn wallet_address(&self) -> &str {
        self.wallet_address.as_deref().unwrap_or_default()
    }

    /// Headers for the gateway call, wallet lower-cased.
    pub fn headers(&self) -> WalletHeaders {
        WalletHeaders::new(self.wallet_address(), self.web3_token.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for WalletAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(WalletAuth {
            wallet_address: header_text(&parts.headers, WALLET_ADDRESS_HEADER)?,
            web3_token: header_text(&parts.headers, "authorization")?,
        })
    }
}

/// A required `authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth(pub String);

impl BearerAuth {
    /// For handlers that validate their parameters before checking the
    /// session, so they take the raw [`HeaderMap`] instead of the extractor.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        header_text(headers, AUTHORIZATION.as_str())?
            .map(BearerAuth)
            .ok_or(AuthError::MissingAuthorization)
    }

    pub fn headers(&self) -> WalletHeaders {
        WalletHeaders::authorization(Some(self.0.clone()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// `authorization` when the caller sent one. Public routes relay it so the
/// backend can personalise the reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedAuthorization(pub Option<String>);

impl ForwardedAuthorization {
    pub fn headers(&self) -> WalletHeaders {
        WalletHeaders::authorization(self.0.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ForwardedAuthorization {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_text(&parts.headers, AUTHORIZATION.as_str()).map(ForwardedAuthorization)
    }
}
