// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Pet registration, adoption and donation posts, donations and payments.

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{ActionForm, json_body, number, positive, text};
use crate::{
    api::proxy::{forward, ProxyPolicy},
    auth::ForwardedAuthorization,
    error::ApiError,
    gateway::BackendRequest,
    models::{
        ActionMessage, AdoptionPostRequest, ApprovePaymentRequest, Breed, DonationCategory,
        DonationPostRequest, Gender, MakeDonationRequest, PetRegistrationRequest,
        PreparePaymentRequest, Region,
    },
    state::AppState,
    validation::{
        is_valid_phone, parse_decimal, parse_enum, parse_int, validate_future_date,
        ValidationError, CONTENT_TOO_LONG, EMPTY_CONTENT, EMPTY_TITLE, INVALID_BREED,
        INVALID_CATEGORY, INVALID_CONTACT, INVALID_DONATION_ID, INVALID_GENDER, INVALID_ITEM_ID,
        INVALID_MEMBER_ID, INVALID_PAYMENT_ITEM_ID, INVALID_PET_AGE, INVALID_PET_ID,
        INVALID_REGION, INVALID_TARGET_AMOUNT, INVALID_WEIGHT, MISSING_DONATION_FIELDS,
        MISSING_PAYMENT_FIELDS, MISSING_REQUIRED_FIELDS, TITLE_TOO_LONG,
    },
};

pub const PET_ERROR: &str = "서버 요청 처리 중 오류가 발생했습니다.";
pub const ADOPTION_ERROR: &str = "입양 공고 작성 중 오류가 발생했습니다.";
pub const DONATION_POST_ERROR: &str = "후원 공고 작성 중 오류가 발생했습니다.";
pub const DONATION_ERROR: &str = "후원 처리 중 오류가 발생했습니다.";
pub const PAYMENT_PREPARE_ERROR: &str = "서버 요청 처리 중 오류가 발생했습니다.";
pub const PAYMENT_APPROVE_ERROR: &str = "결제 승인 처리 중 오류가 발생했습니다.";

const MAX_TITLE_LEN: usize = 100;
const MAX_CONTENT_LEN: usize = 2000;

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(EMPTY_TITLE);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TITLE_TOO_LONG);
    }
    Ok(())
}

fn check_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(EMPTY_CONTENT);
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(CONTENT_TOO_LONG);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetForm {
    pub did: Option<String>,
    pub pet_profile: Option<String>,
    pub pet_name: Option<String>,
    pub breed: Option<String>,
    pub old: Option<String>,
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub color: Option<String>,
    pub feature: Option<String>,
    pub specifics: Option<String>,
    /// `"true"` when neutered; anything else is false.
    pub neutral: Option<String>,
}

impl PetForm {
    fn validate(&self) -> Result<PetRegistrationRequest, ValidationError> {
        let (
            Some(did),
            Some(pet_profile),
            Some(pet_name),
            Some(breed),
            Some(gender),
            Some(color),
            Some(feature),
            Some(specifics),
        ) = (
            text(&self.did),
            text(&self.pet_profile),
            text(&self.pet_name),
            text(&self.breed),
            text(&self.gender),
            text(&self.color),
            text(&self.feature),
            text(&self.specifics),
        )
        else {
            return Err(MISSING_REQUIRED_FIELDS);
        };

        let old = parse_int(self.old.as_deref()).unwrap_or(0);
        if old < 0 {
            return Err(INVALID_PET_AGE);
        }
        let weight = parse_decimal(self.weight.as_deref()).unwrap_or(0.0);
        if weight <= 0.0 {
            return Err(INVALID_WEIGHT);
        }

        Ok(PetRegistrationRequest {
            did: did.to_string(),
            pet_profile: pet_profile.to_string(),
            pet_name: pet_name.to_string(),
            breed: parse_enum::<Breed>(breed, INVALID_BREED)?,
            old,
            weight,
            gender: parse_enum::<Gender>(gender, INVALID_GENDER)?,
            color: color.to_string(),
            feature: feature.to_string(),
            specifics: specifics.to_string(),
            neutral: self.neutral.as_deref() == Some("true"),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionForm {
    pub pet_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub shelter_name: Option<String>,
    pub contact: Option<String>,
    /// `YYYY-MM-DD`, after today.
    pub dead_line: Option<String>,
}

impl AdoptionForm {
    fn validate(&self) -> Result<AdoptionPostRequest, ValidationError> {
        let (
            Some(pet_id),
            Some(title),
            Some(content),
            Some(region),
            Some(district),
            Some(shelter_name),
            Some(contact),
            Some(dead_line),
        ) = (
            number(&self.pet_id),
            text(&self.title),
            text(&self.content),
            text(&self.region),
            text(&self.district),
            text(&self.shelter_name),
            text(&self.contact),
            text(&self.dead_line),
        )
        else {
            return Err(MISSING_REQUIRED_FIELDS);
        };

        let pet_id = positive(pet_id, INVALID_PET_ID)?;
        check_title(title)?;
        check_content(content)?;
        validate_future_date(dead_line, Utc::now().date_naive())?;
        let region = parse_enum::<Region>(region, INVALID_REGION)?;
        if !is_valid_phone(contact) {
            return Err(INVALID_CONTACT);
        }

        Ok(AdoptionPostRequest {
            pet_id,
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            region,
            district: district.trim().to_string(),
            shelter_name: shelter_name.trim().to_string(),
            contact: contact.trim().to_string(),
            dead_line: dead_line.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationPostForm {
    pub member_id: Option<String>,
    pub pet_id: Option<String>,
    pub title: Option<String>,
    pub target_amount: Option<String>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub images: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
}

impl DonationPostForm {
    fn validate(&self) -> Result<DonationPostRequest, ValidationError> {
        let (
            Some(member_id),
            Some(pet_id),
            Some(title),
            Some(target_amount),
            Some(deadline),
            Some(category),
            Some(content),
            Some(bank_name),
            Some(account_number),
            Some(account_holder),
        ) = (
            number(&self.member_id),
            number(&self.pet_id),
            text(&self.title),
            number(&self.target_amount),
            text(&self.deadline),
            text(&self.category),
            text(&self.content),
            text(&self.bank_name),
            text(&self.account_number),
            text(&self.account_holder),
        )
        else {
            return Err(MISSING_REQUIRED_FIELDS);
        };

        let member_id = positive(member_id, INVALID_MEMBER_ID)?;
        let pet_id = positive(pet_id, INVALID_PET_ID)?;
        let target_amount = positive(target_amount, INVALID_TARGET_AMOUNT)?;
        validate_future_date(deadline, Utc::now().date_naive())?;

        Ok(DonationPostRequest {
            member_id,
            pet_id,
            title: title.to_string(),
            target_amount,
            deadline: deadline.to_string(),
            category: parse_enum::<DonationCategory>(category, INVALID_CATEGORY)?,
            content: content.to_string(),
            images: self.images.clone().unwrap_or_default(),
            bank_name: bank_name.to_string(),
            account_number: account_number.to_string(),
            account_holder: account_holder.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationForm {
    pub member_id: Option<String>,
    pub item_id: Option<String>,
    pub donation_id: Option<String>,
}

impl DonationForm {
    fn validate(&self) -> Result<MakeDonationRequest, ValidationError> {
        let (Some(member_id), Some(item_id), Some(donation_id)) = (
            number(&self.member_id),
            number(&self.item_id),
            number(&self.donation_id),
        ) else {
            return Err(MISSING_DONATION_FIELDS);
        };

        Ok(MakeDonationRequest {
            member_id: positive(member_id, INVALID_MEMBER_ID)?,
            item_id: positive(item_id, INVALID_ITEM_ID)?,
            donation_id: positive(donation_id, INVALID_DONATION_ID)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparePaymentForm {
    pub item_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePaymentForm {
    pub order_id: Option<String>,
    pub payment_key: Option<String>,
    pub final_amount: Option<String>,
}

impl ApprovePaymentForm {
    fn validate(&self) -> Result<ApprovePaymentRequest, ValidationError> {
        match (
            text(&self.order_id),
            text(&self.payment_key),
            number(&self.final_amount),
        ) {
            (Some(order_id), Some(payment_key), Some(final_amount)) if final_amount > 0 => {
                Ok(ApprovePaymentRequest {
                    order_id: order_id.to_string(),
                    payment_key: payment_key.to_string(),
                    final_amount,
                })
            }
            _ => Err(MISSING_PAYMENT_FIELDS),
        }
    }
}

async fn post_json<T: serde::Serialize>(
    state: &AppState,
    auth: &ForwardedAuthorization,
    path: &str,
    request: &T,
    fallback: &'static str,
) -> Result<ActionMessage, ApiError> {
    let call = BackendRequest::post(path)
        .headers(auth.headers())
        .json(json_body(request)?);
    forward(&state.gateway, call, ProxyPolicy::action(fallback)).await
}

#[utoipa::path(
    post,
    path = "/actions/pet/register",
    tag = "Pets",
    request_body(content = PetForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn register_pet(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<PetForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    post_json(&state, &auth, "/api/pet/register", &request, PET_ERROR).await
}

#[utoipa::path(
    post,
    path = "/actions/adoption",
    tag = "Adoption",
    request_body(content = AdoptionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_adoption_post(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<AdoptionForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    post_json(&state, &auth, "/api/adoption/", &request, ADOPTION_ERROR).await
}

#[utoipa::path(
    post,
    path = "/actions/donation/posts",
    tag = "Donations",
    request_body(content = DonationPostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_donation_post(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<DonationPostForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    post_json(&state, &auth, "/api/donation/posts", &request, DONATION_POST_ERROR).await
}

#[utoipa::path(
    post,
    path = "/actions/donation",
    tag = "Donations",
    request_body(content = DonationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn make_donation(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<DonationForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    post_json(&state, &auth, "/api/donation-list", &request, DONATION_ERROR).await
}

#[utoipa::path(
    post,
    path = "/actions/payment/prepare",
    tag = "Payment",
    request_body(content = PreparePaymentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn prepare_payment(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<PreparePaymentForm>,
) -> Result<ActionMessage, ApiError> {
    let item_id = number(&form.item_id)
        .filter(|id| *id > 0)
        .ok_or(INVALID_PAYMENT_ITEM_ID)?;
    let request = PreparePaymentRequest { item_id };
    post_json(&state, &auth, "/api/payment/prepare", &request, PAYMENT_PREPARE_ERROR).await
}

#[utoipa::path(
    post,
    path = "/actions/payment/approve",
    tag = "Payment",
    request_body(content = ApprovePaymentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn approve_payment(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<ApprovePaymentForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    post_json(&state, &auth, "/api/payment/approve", &request, PAYMENT_APPROVE_ERROR).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{app_for, post_form};
    use axum::http::StatusCode;
    use mockito::Matcher;
    use serde_json::json;

    const PET: &str = "did=did%3Aethr%3Abesu%3A0x01&petProfile=profile.png&petName=%EC%B4%88%EC%BD%94\
        &breed=MALTESE&old=3&weight=4.2&gender=MALE&color=white&feature=calm&specifics=none&neutral=true";

    const ADOPTION: &str = "petId=12&title=%EC%9E%85%EC%96%91&content=%EC%B0%A9%ED%95%9C+%EC%95%84%EC%9D%B4\
        &region=SEOUL&district=Mapo&shelterName=Happy&contact=010-1234-5678&deadLine=2099-12-31";

    #[tokio::test]
    async fn pet_registration_sends_typed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/pet/register")
            .match_body(Matcher::PartialJson(json!({
                "petName": "초코",
                "breed": "MALTESE",
                "old": 3,
                "weight": 4.2,
                "neutral": true
            })))
            .with_status(200)
            .with_body(r#"{"isSuccess":true,"status":"200","code":"PET200","message":"ok","result":{"petId":1}}"#)
            .create_async()
            .await;

        let (status, reply) = post_form(app_for(&server), "/actions/pet/register", PET, &[]).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["code"], "PET200");
    }

    #[tokio::test]
    async fn pet_rules() {
        let server = mockito::Server::new_async().await;
        let app = app_for(&server);
        let cases = [
            (PET.replace("color=white", "color="), "MISSING_REQUIRED_FIELDS"),
            (PET.replace("old=3", "old=-1"), "INVALID_AGE"),
            (PET.replace("weight=4.2", "weight=0"), "INVALID_WEIGHT"),
            (PET.replace("breed=MALTESE", "breed=CAT"), "INVALID_BREED"),
            (PET.replace("gender=MALE", "gender=X"), "INVALID_GENDER"),
        ];
        for (body, code) in cases {
            let (_, reply) = post_form(app.clone(), "/actions/pet/register", &body, &[]).await;
            assert_eq!(reply["code"], code);
        }
    }

    #[tokio::test]
    async fn adoption_post_trims_and_forwards() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/adoption/")
            .match_body(Matcher::PartialJson(json!({
                "petId": 12,
                "content": "착한 아이",
                "region": "SEOUL",
                "deadLine": "2099-12-31"
            })))
            .with_status(201)
            .with_body(r#"{"adoptId":3}"#)
            .create_async()
            .await;

        let (status, reply) = post_form(app_for(&server), "/actions/adoption", ADOPTION, &[]).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["result"]["adoptId"], 3);
    }

    #[tokio::test]
    async fn adoption_rules() {
        let server = mockito::Server::new_async().await;
        let app = app_for(&server);
        let long_title = "t".repeat(101);
        let cases = [
            (ADOPTION.replace("petId=12", "petId=0"), "MISSING_REQUIRED_FIELDS"),
            (ADOPTION.replace("petId=12", "petId=-4"), "INVALID_PET_ID"),
            (ADOPTION.replace("title=%EC%9E%85%EC%96%91", "title=+++"), "EMPTY_TITLE"),
            (
                ADOPTION.replace("title=%EC%9E%85%EC%96%91", &format!("title={long_title}")),
                "TITLE_TOO_LONG",
            ),
            (ADOPTION.replace("2099-12-31", "2099/12/31"), "INVALID_DATE_FORMAT"),
            (ADOPTION.replace("2099-12-31", "2000-01-01"), "INVALID_DEADLINE"),
            (ADOPTION.replace("SEOUL", "TOKYO"), "INVALID_REGION"),
            (ADOPTION.replace("010-1234-5678", "call-me"), "INVALID_CONTACT"),
        ];
        for (body, code) in cases {
            let (status, reply) = post_form(app.clone(), "/actions/adoption", &body, &[]).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{code}");
            assert_eq!(reply["code"], code);
        }
    }

    #[tokio::test]
    async fn donation_post_defaults_images() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/donation/posts")
            .match_body(Matcher::PartialJson(json!({
                "memberId": 1,
                "targetAmount": 500000,
                "category": "SURGERY",
                "images": ""
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let body = "memberId=1&petId=2&title=t&targetAmount=500000&deadline=2099-01-01\
            &category=SURGERY&content=c&bankName=b&accountNumber=1&accountHolder=h";
        let (status, _) = post_form(app_for(&server), "/actions/donation/posts", body, &[]).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);

        let bad = body.replace("targetAmount=500000", "targetAmount=-5");
        let (_, reply) = post_form(app_for(&server), "/actions/donation/posts", &bad, &[]).await;
        assert_eq!(reply["code"], "INVALID_TARGET_AMOUNT");

        let bad = body.replace("SURGERY", "TOYS");
        let (_, reply) = post_form(app_for(&server), "/actions/donation/posts", &bad, &[]).await;
        assert_eq!(reply["code"], "INVALID_CATEGORY");
    }

    #[tokio::test]
    async fn donation_requires_all_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/donation-list")
            .match_body(Matcher::Json(json!({"memberId": 1, "itemId": 2, "donationId": 3})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let app = app_for(&server);

        let (_, reply) = post_form(app.clone(), "/actions/donation", "memberId=1&itemId=2", &[]).await;
        assert_eq!(reply["code"], "MISSING_REQUIRED_FIELDS");
        assert_eq!(reply["message"], "memberId, itemId, donationId는 필수 항목입니다.");

        let (_, reply) =
            post_form(app.clone(), "/actions/donation", "memberId=1&itemId=-2&donationId=3", &[]).await;
        assert_eq!(reply["code"], "INVALID_ITEM_ID");

        let (status, _) =
            post_form(app, "/actions/donation", "memberId=1&itemId=2&donationId=3", &[]).await;
        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn payments() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/payment/prepare")
            .match_body(Matcher::Json(json!({"itemId": 9})))
            .with_status(200)
            .with_body(r#"{"orderId":"order-1","amount":1000}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/payment/approve")
            .with_status(400)
            .with_body(r#"{"message":"결제 금액이 일치하지 않습니다."}"#)
            .create_async()
            .await;
        let app = app_for(&server);

        let (_, reply) = post_form(app.clone(), "/actions/payment/prepare", "itemId=0", &[]).await;
        assert_eq!(reply["code"], "INVALID_ITEM_ID");

        let (_, reply) = post_form(app.clone(), "/actions/payment/prepare", "itemId=9", &[]).await;
        assert_eq!(reply["result"]["orderId"], "order-1");

        let (_, reply) = post_form(
            app.clone(),
            "/actions/payment/approve",
            "orderId=order-1&paymentKey=pk&finalAmount=0",
            &[],
        )
        .await;
        assert_eq!(reply["code"], "MISSING_REQUIRED_FIELDS");

        let (status, reply) = post_form(
            app,
            "/actions/payment/approve",
            "orderId=order-1&paymentKey=pk&finalAmount=1000",
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["message"], "결제 금액이 일치하지 않습니다.");
    }
}
