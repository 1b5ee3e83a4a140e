// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use super::{ActionForm, json_body, number, text};
use crate::{
    api::proxy::{forward, ProxyPolicy},
    auth::ForwardedAuthorization,
    error::ApiError,
    gateway::BackendRequest,
    models::{ActionMessage, Gender, SignupRequest, UserType},
    state::AppState,
    validation::{
        is_valid_phone, length_between, parse_enum, validate_email, ValidationError,
        INVALID_AGE, INVALID_GENDER, INVALID_NICKNAME, INVALID_PHONE_NUMBER, INVALID_TYPE,
        INVALID_USERNAME, INVALID_WALLET_ADDRESS, MISSING_LOGIN_WALLET_ADDRESS,
        MISSING_REQUIRED_FIELDS,
    },
};

pub const SIGNUP_ERROR: &str = "회원가입 처리 중 오류가 발생했습니다.";
pub const LOGIN_ERROR: &str = "로그인 처리 중 오류가 발생했습니다.";

/// Loose wallet check used by signup and login: at least ten characters.
const MIN_WALLET_LEN: usize = 10;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub wallet_address: Option<String>,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub old: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub email: Option<String>,
}

impl SignupForm {
    fn validate(&self) -> Result<SignupRequest, ValidationError> {
        let (
            Some(wallet_address),
            Some(username),
            Some(nickname),
            Some(gender),
            Some(old),
            Some(address),
            Some(phone_number),
            Some(user_type),
            Some(email),
        ) = (
            text(&self.wallet_address),
            text(&self.username),
            text(&self.nickname),
            text(&self.gender),
            number(&self.old),
            text(&self.address),
            text(&self.phone_number),
            text(&self.user_type),
            text(&self.email),
        )
        else {
            return Err(MISSING_REQUIRED_FIELDS);
        };

        if wallet_address.chars().count() < MIN_WALLET_LEN {
            return Err(INVALID_WALLET_ADDRESS);
        }
        if !length_between(username, 3, 20) {
            return Err(INVALID_USERNAME);
        }
        if !length_between(nickname, 2, 15) {
            return Err(INVALID_NICKNAME);
        }
        if !(0..=150).contains(&old) {
            return Err(INVALID_AGE);
        }
        validate_email(email)?;
        if !is_valid_phone(phone_number) {
            return Err(INVALID_PHONE_NUMBER);
        }

        Ok(SignupRequest {
            wallet_address: wallet_address.to_string(),
            username: username.to_string(),
            nickname: nickname.to_string(),
            gender: parse_enum::<Gender>(gender, INVALID_GENDER)?,
            old,
            address: address.to_string(),
            phone_number: phone_number.to_string(),
            user_type: parse_enum::<UserType>(user_type, INVALID_TYPE)?,
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub wallet_address: Option<String>,
}

#[utoipa::path(
    post,
    path = "/actions/auth/signup",
    tag = "Account",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<SignupForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    let call = BackendRequest::post("/api/auth/signup")
        .headers(auth.headers())
        .json(json_body(&request)?);
    forward(&state.gateway, call, ProxyPolicy::action(SIGNUP_ERROR)).await
}

#[utoipa::path(
    post,
    path = "/actions/auth/login",
    tag = "Account",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ActionForm(form): ActionForm<LoginForm>,
) -> Result<ActionMessage, ApiError> {
    let wallet_address = text(&form.wallet_address).ok_or(MISSING_LOGIN_WALLET_ADDRESS)?;
    let wallet_address = wallet_address.trim();
    if wallet_address.chars().count() < MIN_WALLET_LEN {
        return Err(INVALID_WALLET_ADDRESS.into());
    }

    let call = BackendRequest::post("/api/auth/login")
        .json(json!({ "walletAddress": wallet_address }));
    forward(&state.gateway, call, ProxyPolicy::action(LOGIN_ERROR)).await
}
