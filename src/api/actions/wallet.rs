// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Wallet-authenticated actions: email verification and guardian
//! registration. Credentials come from the form first, then from the
//! `walletaddress` / `authorization` headers.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use utoipa::ToSchema;

use super::{ActionForm, text};
use crate::{
    auth::WalletAuth,
    error::ApiError,
    flows::RegistrationResult,
    gateway::GatewayError,
    models::{trimmed, ActionMessage, Gender, GuardianRegistrationRequest, VerificationMethod},
    state::AppState,
    validation::{
        is_valid_phone, length_between, parse_enum, validate_email, validate_send_code,
        validate_verify_code, validate_wallet_address, ValidationError, INVALID_AGE,
        INVALID_GENDER, INVALID_NAME, INVALID_PHONE, MISSING_GUARDIAN_EMAIL,
        MISSING_WALLET_ADDRESS,
    },
};

pub const SEND_CODE_ERROR: &str = "인증 코드 발송 중 오류가 발생했습니다.";
pub const VERIFY_CODE_ERROR: &str = "인증 코드 검증 중 오류가 발생했습니다.";
pub const GUARDIAN_ERROR: &str = "보호자 등록 중 오류가 발생했습니다.";

const CODE_SENT: &str = "인증 코드가 발송되었습니다!";
const EMAIL_VERIFIED: &str = "이메일 인증이 완료되었습니다!";
const GUARDIAN_REGISTERED: &str = "보호자 등록이 완료되었습니다!";
const SIGN_TRANSACTION: &str = "지갑에서 트랜잭션에 서명해주세요.";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeForm {
    pub email: Option<String>,
    pub wallet_address: Option<String>,
    pub web3_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeForm {
    pub code: Option<String>,
    pub wallet_address: Option<String>,
    pub web3_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuardianForm {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    /// 1 SMS, 2 email (default), 3 both.
    pub verification_method: Option<String>,
    pub gender: Option<String>,
    pub old: Option<String>,
    pub address: Option<String>,
    /// Signed transaction (or broadcast hash) for the second submission.
    pub signed_tx: Option<String>,
    pub wallet_address: Option<String>,
    pub web3_token: Option<String>,
}

impl GuardianForm {
    fn validate(&self, wallet_address: &str) -> Result<GuardianRegistrationRequest, ValidationError> {
        let email = text(&self.email).ok_or(MISSING_GUARDIAN_EMAIL)?;
        if wallet_address.is_empty() {
            return Err(MISSING_WALLET_ADDRESS);
        }
        validate_email(email)?;
        validate_wallet_address(wallet_address)?;

        if let Some(name) = text(&self.name) {
            if !length_between(name, 2, 50) {
                return Err(INVALID_NAME);
            }
        }
        if let Some(phone) = text(&self.phone) {
            if !is_valid_phone(phone) {
                return Err(INVALID_PHONE);
            }
        }
        let method = VerificationMethod::parse(self.verification_method.as_deref())?;
        let gender = text(&self.gender)
            .map(|g| parse_enum::<Gender>(g, INVALID_GENDER))
            .transpose()?;
        let old = text(&self.old)
            .map(|raw| raw.trim().parse::<u8>().ok().filter(|age| *age <= 150).ok_or(INVALID_AGE))
            .transpose()?;

        Ok(GuardianRegistrationRequest {
            phone: trimmed(self.phone.as_deref()),
            name: trimmed(self.name.as_deref()),
            gender,
            old,
            address: trimmed(self.address.as_deref()),
            signed_tx: trimmed(self.signed_tx.as_deref()),
            ..GuardianRegistrationRequest::new(email, method)
        })
    }
}

fn rejected(error: GatewayError, fallback: &str) -> ApiError {
    if error.status().is_none() {
        error!(%error, "Wallet action failed");
    }
    error.into_api_error(fallback, ApiError::network)
}

fn body_text<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Ask the backend to email a six-digit verification code.
#[utoipa::path(
    post,
    path = "/actions/email/send-code",
    tag = "Email",
    request_body(content = SendCodeForm, content_type = "application/x-www-form-urlencoded"),
    params(("walletaddress" = Option<String>, Header, description = "Wallet address when not in the form")),
    responses(
        (status = 200, description = "Code sent", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage),
        (status = 401, description = "Wallet address missing", body = ActionMessage)
    )
)]
pub async fn send_code(
    State(state): State<AppState>,
    auth: WalletAuth,
    ActionForm(form): ActionForm<SendCodeForm>,
) -> Result<ActionMessage, ApiError> {
    let auth = auth.merge(form.wallet_address.as_deref(), form.web3_token.as_deref());
    let email = form.email.as_deref().unwrap_or_default();
    validate_send_code(email, auth.wallet_address())?;

    let body = state
        .gateway
        .send_verification_code(email, auth.headers())
        .await
        .map_err(|e| rejected(e, SEND_CODE_ERROR))?;

    info!("Verification code requested");
    let message = body_text(&body, "message").unwrap_or(CODE_SENT).to_string();
    Ok(ActionMessage::success(message, Some(body)))
}

/// Check a verification code. Failures report `remainingAttempts`.
#[utoipa::path(
    post,
    path = "/actions/email/verify-code",
    tag = "Email",
    request_body(content = VerifyCodeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Email verified, possibly with a warning", body = ActionMessage),
        (status = 400, description = "Invalid or wrong code", body = ActionMessage),
        (status = 401, description = "Wallet address missing", body = ActionMessage)
    )
)]
pub async fn verify_code(
    State(state): State<AppState>,
    auth: WalletAuth,
    ActionForm(form): ActionForm<VerifyCodeForm>,
) -> Result<ActionMessage, ApiError> {
    let auth = auth.merge(form.wallet_address.as_deref(), form.web3_token.as_deref());
    let code = form.code.as_deref().unwrap_or_default();
    validate_verify_code(code, auth.wallet_address())?;

    let body = match state.gateway.verify_email_code(code, auth.headers()).await {
        Ok(body) => body,
        Err(GatewayError::Status { status, body }) => {
            let remaining = body.remaining_attempts;
            return Err(ApiError::from_backend(status, &body, VERIFY_CODE_ERROR)
                .with_result(json!({ "remainingAttempts": remaining })));
        }
        Err(other) => return Err(rejected(other, VERIFY_CODE_ERROR)),
    };

    let email = body.get("email").cloned().unwrap_or(Value::Null);
    if let Some(warning) = body_text(&body, "warning") {
        return Ok(ActionMessage::success_with_code(
            "SUCCESS_WITH_WARNING",
            warning,
            Some(json!({ "email": email, "warning": warning })),
        ));
    }

    info!("Email verified");
    let message = body_text(&body, "message").unwrap_or(EMAIL_VERIFIED).to_string();
    Ok(ActionMessage::success(message, Some(json!({ "email": email }))))
}

/// Register the wallet as a guardian. When the backend asks for a signature
/// the reply carries `transactionData` under code `SIGNATURE_REQUIRED`; the
/// caller resubmits with `signedTx`.
#[utoipa::path(
    post,
    path = "/actions/guardian/register",
    tag = "Guardian",
    request_body(content = GuardianForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Registered or signature required", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage),
        (status = 401, description = "Wallet address missing", body = ActionMessage)
    )
)]
pub async fn register_guardian(
    State(state): State<AppState>,
    auth: WalletAuth,
    ActionForm(form): ActionForm<GuardianForm>,
) -> Result<ActionMessage, ApiError> {
    let auth = auth.merge(form.wallet_address.as_deref(), form.web3_token.as_deref());
    let request = form.validate(auth.wallet_address())?;

    let response = state
        .gateway
        .register_guardian(&request, auth.headers())
        .await
        .map_err(|e| rejected(e, GUARDIAN_ERROR))?;

    if let Some(transaction) = response.signature_request() {
        info!("Guardian registration awaits a wallet signature");
        return Ok(ActionMessage::success_with_code(
            "SIGNATURE_REQUIRED",
            response.message.as_deref().unwrap_or(SIGN_TRANSACTION),
            Some(json!({ "requiresSignature": true, "transactionData": transaction })),
        ));
    }

    info!(guardian_id = ?response.guardian_id, "Guardian registered");
    let message = response
        .message
        .clone()
        .unwrap_or_else(|| GUARDIAN_REGISTERED.to_string());
    let result = super::json_body(&RegistrationResult::from(response))?;
    Ok(ActionMessage::success(message, Some(result)))
}
