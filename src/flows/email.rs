// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Two-step email verification: send a code, then verify it.
//!
//! ```text
//! Email --send ok--> Code --verify ok--> (verified, marker recorded)
//!   ^                  |
//!   +------resend------+
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{body_flag, body_text, failure_message, WALLET_NOT_CONNECTED};
use crate::{
    gateway::{
        client::{SEND_CODE_FAILED, VERIFY_CODE_FAILED},
        GatewayClient, GatewayError, WalletHeaders,
    },
    session::VerifiedEmailMarker,
    validation,
    web3::{optional_token, WalletSigner, Web3TokenManager, DEFAULT_EXPIRES_IN},
};

pub const MAX_ATTEMPTS: u64 = 3;

pub const CODE_SENT: &str = "인증 코드가 이메일로 발송되었습니다!";
pub const EMAIL_VERIFIED: &str = "이메일 인증이 완료되었습니다!";
pub const CODE_NOT_REQUESTED: &str = "먼저 인증 코드를 요청해주세요.";

const SEND_REJECTED: &str = "코드 발송에 실패했습니다";
const VERIFY_REJECTED: &str = "코드 검증에 실패했습니다";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStep {
    Email,
    Code,
}

/// What a submit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailEvent {
    CodeSent,
    Verified {
        email: String,
        warning: Option<String>,
    },
    Failed(String),
}

pub struct EmailVerificationFlow {
    gateway: GatewayClient,
    tokens: Arc<Web3TokenManager>,
    wallet: Option<Arc<dyn WalletSigner>>,
    marker: Option<VerifiedEmailMarker>,
    step: EmailStep,
    email: String,
    error: Option<String>,
    success: Option<String>,
    remaining_attempts: Option<u64>,
}

impl EmailVerificationFlow {
    pub fn new(
        gateway: GatewayClient,
        tokens: Arc<Web3TokenManager>,
        wallet: Option<Arc<dyn WalletSigner>>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            wallet,
            marker: None,
            step: EmailStep::Email,
            email: String::new(),
            error: None,
            success: None,
            remaining_attempts: None,
        }
    }

    /// Record the verified email here on success.
    pub fn with_marker(mut self, marker: VerifiedEmailMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn set_wallet(&mut self, wallet: Option<Arc<dyn WalletSigner>>) {
        self.wallet = wallet;
    }

    pub fn step(&self) -> EmailStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn remaining_attempts(&self) -> Option<u64> {
        self.remaining_attempts
    }

    /// e.g. `남은 시도 횟수: 2/3`
    pub fn attempts_notice(&self) -> Option<String> {
        self.remaining_attempts
            .map(|left| format!("남은 시도 횟수: {}/{}", left, MAX_ATTEMPTS))
    }

    fn fail(&mut self, message: impl Into<String>) -> EmailEvent {
        let message = message.into();
        self.error = Some(message.clone());
        EmailEvent::Failed(message)
    }

    async fn headers(&self, wallet: &dyn WalletSigner) -> WalletHeaders {
        let token = optional_token(self.tokens.get_token(wallet, DEFAULT_EXPIRES_IN).await);
        WalletHeaders::new(&wallet.address(), token)
    }

    pub async fn send_code(&mut self, email: &str) -> EmailEvent {
        let Some(wallet) = self.wallet.clone() else {
            return self.fail(WALLET_NOT_CONNECTED);
        };
        self.error = None;
        self.success = None;

        if let Err(rule) = validation::validate_send_code(email, &wallet.address()) {
            return self.fail(rule.message);
        }

        let headers = self.headers(wallet.as_ref()).await;
        match self.gateway.send_verification_code(email, headers).await {
            Ok(body) if body_flag(&body, "success") => {
                info!("Verification code sent");
                self.email = email.trim().to_string();
                self.success = Some(CODE_SENT.to_string());
                self.step = EmailStep::Code;
                EmailEvent::CodeSent
            }
            Ok(body) => self.fail(rejection(&body, SEND_REJECTED)),
            Err(error) => {
                warn!(%error, "Sending verification code failed");
                self.fail(failure_message(&error, SEND_CODE_FAILED))
            }
        }
    }

    pub async fn verify_code(&mut self, code: &str) -> EmailEvent {
        let Some(wallet) = self.wallet.clone() else {
            return self.fail(WALLET_NOT_CONNECTED);
        };
        if self.step != EmailStep::Code {
            return self.fail(CODE_NOT_REQUESTED);
        }
        self.error = None;
        self.success = None;

        if let Err(rule) = validation::validate_verify_code(code, &wallet.address()) {
            return self.fail(rule.message);
        }

        let headers = self.headers(wallet.as_ref()).await;
        match self.gateway.verify_email_code(code, headers).await {
            Ok(body) if body_flag(&body, "success") => {
                info!("Email verified");
                self.success = Some(EMAIL_VERIFIED.to_string());
                self.remaining_attempts = None;
                if let Some(marker) = &self.marker {
                    if let Err(error) = marker.record(&self.email) {
                        warn!(%error, "Could not record verified email");
                    }
                }
                EmailEvent::Verified {
                    email: self.email.clone(),
                    warning: body_text(&body, "warning"),
                }
            }
            Ok(body) => {
                self.remaining_attempts = body.get("remainingAttempts").and_then(Value::as_u64);
                self.fail(rejection(&body, VERIFY_REJECTED))
            }
            Err(error) => {
                warn!(%error, "Verifying code failed");
                if let GatewayError::Status { body, .. } = &error {
                    self.remaining_attempts = body.remaining_attempts;
                }
                self.fail(failure_message(&error, VERIFY_CODE_FAILED))
            }
        }
    }

    /// Back to the email step with a clean slate.
    pub fn resend(&mut self) {
        self.step = EmailStep::Email;
        self.error = None;
        self.success = None;
        self.remaining_attempts = None;
    }
}

fn rejection(body: &Value, fallback: &str) -> String {
    body_text(body, "error")
        .or_else(|| body_text(body, "message"))
        .unwrap_or_else(|| fallback.to_string())
}
