// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Multi-step, wallet-driven flows: email verification and guardian
//! registration.
//!
//! Flows never return errors to their caller. Every failure is turned into
//! a user-facing message held in the flow state, and the flow stays usable.

pub mod email;
pub mod guardian;

use serde_json::Value;

use crate::gateway::GatewayError;

pub use email::{EmailEvent, EmailStep, EmailVerificationFlow};
pub use guardian::{
    GuardianFlowError, GuardianForm, GuardianRegistrationFlow, RegistrationResult,
    RegistrationState,
};

pub const NETWORK_FAILURE: &str = "네트워크 오류가 발생했습니다";
pub const WALLET_NOT_CONNECTED: &str = "지갑을 연결해주세요";

/// Message shown for a failed gateway call.
fn failure_message(error: &GatewayError, fallback: &str) -> String {
    match error {
        GatewayError::Status { .. } => error.user_message(fallback),
        GatewayError::SessionExpired { .. } => error.to_string(),
        _ => NETWORK_FAILURE.to_string(),
    }
}

fn body_flag(body: &Value, key: &str) -> bool {
    body.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn body_text(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
