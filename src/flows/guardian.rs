// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Guardian registration saga.
//!
//! ```text
//! Editing -> Submitted -> Complete
//!                |
//!                +-> AwaitingSignature -> Finalizing -> Complete
//!                                              |
//!                                              +-> Failed (signed tx kept)
//! ```
//!
//! A registration the backend accepts without a signature completes after
//! one call. Otherwise the wallet signs (offline first, broadcast as the
//! fallback) and the same registration is sent again with `signedTx`. If
//! that second call fails, the next [`GuardianRegistrationFlow::submit`]
//! resumes at `Finalizing` with the value already obtained, so the wallet
//! is not prompted twice. Editing the form drops that value.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{failure_message, WALLET_NOT_CONNECTED};
use crate::{
    gateway::{GatewayClient, WalletHeaders},
    models::{
        trimmed, Gender, GuardianRegistrationRequest, RegistrationResponse, TransactionData,
        VerificationMethod,
    },
    session::{StoreError, VerifiedEmailMarker},
    validation::{validate_email, validate_wallet_address},
    web3::{optional_token, WalletSigner, Web3TokenManager, DEFAULT_EXPIRES_IN},
};

pub const REGISTRATION_FAILED: &str = "보호자 등록에 실패했습니다";

#[derive(Debug, Error)]
pub enum GuardianFlowError {
    #[error("이메일 인증을 먼저 완료해주세요")]
    MissingVerifiedEmail,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Editable registration fields. Blank text fields are left out of the
/// request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardianForm {
    pub name: String,
    pub phone: String,
    pub verification_method: VerificationMethod,
    pub gender: Option<Gender>,
    pub old: Option<u8>,
    pub address: String,
}

impl GuardianForm {
    fn request(&self, email: &str) -> GuardianRegistrationRequest {
        GuardianRegistrationRequest {
            phone: trimmed(Some(&self.phone)),
            name: trimmed(Some(&self.name)),
            gender: self.gender,
            old: self.old,
            address: trimmed(Some(&self.address)),
            ..GuardianRegistrationRequest::new(email, self.verification_method)
        }
    }
}

/// What the success view shows.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub guardian_id: Option<i64>,
    pub auth_id: Option<i64>,
    pub tx_hash: Option<String>,
    #[schema(value_type = Option<String>)]
    pub spring_job_id: Option<Value>,
    pub message: Option<String>,
}

impl From<RegistrationResponse> for RegistrationResult {
    fn from(response: RegistrationResponse) -> Self {
        Self {
            guardian_id: response.guardian_id,
            auth_id: response.auth_id,
            tx_hash: response.tx_hash,
            spring_job_id: response.spring_job_id,
            message: response.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationState {
    Editing,
    Submitted,
    AwaitingSignature(TransactionData),
    Finalizing { signed_tx: String },
    Complete(RegistrationResult),
    Failed(String),
}

pub struct GuardianRegistrationFlow {
    email: String,
    form: GuardianForm,
    gateway: GatewayClient,
    tokens: Arc<Web3TokenManager>,
    wallet: Option<Arc<dyn WalletSigner>>,
    state: RegistrationState,
    pending_signed_tx: Option<String>,
}

impl GuardianRegistrationFlow {
    pub fn new(
        email: &str,
        gateway: GatewayClient,
        tokens: Arc<Web3TokenManager>,
        wallet: Option<Arc<dyn WalletSigner>>,
    ) -> Self {
        Self {
            email: email.trim().to_string(),
            form: GuardianForm::default(),
            gateway,
            tokens,
            wallet,
            state: RegistrationState::Editing,
            pending_signed_tx: None,
        }
    }

    /// Start from the verified-email marker, consuming it.
    pub fn from_verified_email(
        marker: &VerifiedEmailMarker,
        gateway: GatewayClient,
        tokens: Arc<Web3TokenManager>,
        wallet: Option<Arc<dyn WalletSigner>>,
    ) -> Result<Self, GuardianFlowError> {
        let email = marker
            .consume()?
            .ok_or(GuardianFlowError::MissingVerifiedEmail)?;
        Ok(Self::new(&email, gateway, tokens, wallet))
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn form(&self) -> &GuardianForm {
        &self.form
    }

    /// Edit the form. Any signed transaction from an earlier attempt is
    /// discarded since it no longer matches the request.
    pub fn form_mut(&mut self) -> &mut GuardianForm {
        if self.pending_signed_tx.take().is_some() {
            info!("Form edited, discarding pending signed transaction");
        }
        if !matches!(self.state, RegistrationState::Complete(_)) {
            self.state = RegistrationState::Editing;
        }
        &mut self.form
    }

    pub fn set_wallet(&mut self, wallet: Option<Arc<dyn WalletSigner>>) {
        self.wallet = wallet;
    }

    /// Run the saga until it completes or fails.
    pub async fn submit(&mut self) -> &RegistrationState {
        if matches!(self.state, RegistrationState::Complete(_)) {
            return &self.state;
        }
        let Some(wallet) = self.wallet.clone() else {
            self.state = RegistrationState::Failed(WALLET_NOT_CONNECTED.to_string());
            return &self.state;
        };
        let address = wallet.address();
        if let Err(invalid) =
            validate_email(&self.email).and_then(|()| validate_wallet_address(&address))
        {
            warn!(code = invalid.code, "Guardian registration rejected locally");
            self.state = RegistrationState::Failed(invalid.message.to_string());
            return &self.state;
        }

        let request = self.form.request(&self.email);
        let token = optional_token(self.tokens.get_token(wallet.as_ref(), DEFAULT_EXPIRES_IN).await);
        let headers = WalletHeaders::new(&address, token);

        self.state = match self.pending_signed_tx.clone() {
            Some(signed_tx) => {
                info!("Resuming registration with the signed transaction");
                RegistrationState::Finalizing { signed_tx }
            }
            None => self.register(&request, headers.clone()).await,
        };

        if let RegistrationState::AwaitingSignature(tx) = &self.state {
            self.state = match sign(wallet.as_ref(), tx).await {
                Ok(signed_tx) => {
                    self.pending_signed_tx = Some(signed_tx.clone());
                    RegistrationState::Finalizing { signed_tx }
                }
                Err(message) => RegistrationState::Failed(message),
            };
        }

        if let RegistrationState::Finalizing { signed_tx } = &self.state {
            let request = request.with_signed_tx(signed_tx.as_str());
            self.state = self.finalize(&request, headers).await;
            if matches!(self.state, RegistrationState::Complete(_)) {
                self.pending_signed_tx = None;
            }
        }

        &self.state
    }

    async fn register(
        &mut self,
        request: &GuardianRegistrationRequest,
        headers: WalletHeaders,
    ) -> RegistrationState {
        self.state = RegistrationState::Submitted;
        match self.gateway.register_guardian(request, headers).await {
            Ok(response) => {
                if let Some(tx) = response.signature_request() {
                    info!("Registration requires a wallet signature");
                    RegistrationState::AwaitingSignature(tx.clone())
                } else {
                    complete(response)
                }
            }
            Err(error) => {
                warn!(%error, "Guardian registration failed");
                RegistrationState::Failed(failure_message(&error, REGISTRATION_FAILED))
            }
        }
    }

    async fn finalize(
        &self,
        request: &GuardianRegistrationRequest,
        headers: WalletHeaders,
    ) -> RegistrationState {
        match self.gateway.register_guardian(request, headers).await {
            Ok(response) => complete(response),
            Err(error) => {
                warn!(%error, "Guardian registration could not be finalized");
                RegistrationState::Failed(failure_message(&error, REGISTRATION_FAILED))
            }
        }
    }
}

fn complete(response: RegistrationResponse) -> RegistrationState {
    if response.success {
        info!(guardian_id = ?response.guardian_id, "Guardian registered");
        RegistrationState::Complete(response.into())
    } else {
        RegistrationState::Failed(response.failure_message(REGISTRATION_FAILED))
    }
}

/// Offline signature first, broadcast as the fallback. The backend receives
/// either a raw transaction or a transaction hash in the same field.
async fn sign(wallet: &dyn WalletSigner, tx: &TransactionData) -> Result<String, String> {
    match wallet.sign_transaction(tx).await {
        Ok(raw) => {
            info!("Transaction signed offline");
            Ok(raw)
        }
        Err(error) => {
            warn!(%error, "Offline signing unavailable, broadcasting instead");
            let hash = wallet
                .send_transaction(tx)
                .await
                .map_err(|error| error.to_string())?;
            info!(%hash, "Transaction broadcast");
            Ok(hash)
        }
    }
}
