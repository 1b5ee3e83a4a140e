// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Wire Models
//!
//! Request and response structures exchanged with the API Gateway and with
//! callers of this server. Field names follow the gateway's camelCase JSON.
//!
//! ## Model Categories
//!
//! - **Envelope**: [`ActionMessage`], the `{isSuccess, status, code, message, result}`
//!   shape every proxied call resolves to
//! - **Guardian registration**: request, response and [`TransactionData`]
//! - **Session**: [`User`], [`AuthResponse`]
//! - **Pagination**: [`CursorPage`], [`CursorQuery`]
//! - **Domain requests**: pets, adoption, donations, stories, chat, payment

use std::{fmt, str::FromStr};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::validation::{self, ValidationError};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address, validated on construction.
///
/// Format: `0x` followed by 40 hexadecimal characters. The original casing is
/// kept; use [`WalletAddress::lowercase`] for the `walletaddress` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::validate_wallet_address(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Case-insensitive comparison; checksummed and lower-case forms match.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validation::validate_wallet_address(&value)?;
        Ok(Self(value))
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// The uniform result of every server action and route handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub is_success: bool,
    /// HTTP status as a decimal string, e.g. `"400"`.
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub result: Option<Value>,
}

impl ActionMessage {
    pub fn success(message: impl Into<String>, result: Option<Value>) -> Self {
        Self::success_with_code("SUCCESS", message, result)
    }

    pub fn success_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        result: Option<Value>,
    ) -> Self {
        Self {
            is_success: true,
            status: StatusCode::OK.as_u16().to_string(),
            code: code.into(),
            message: message.into(),
            result,
        }
    }

    pub fn failure(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            status: status.as_u16().to_string(),
            code: code.into(),
            message: message.into(),
            result: None,
        }
    }

    /// The `status` field as an HTTP status; unparsable values become 500.
    pub fn http_status(&self) -> StatusCode {
        self.status
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ValidationError> for ActionMessage {
    fn from(error: ValidationError) -> Self {
        Self::failure(error.status, error.code, error.message)
    }
}

impl IntoResponse for ActionMessage {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self)).into_response()
    }
}

// =============================================================================
// Fixed vocabularies
// =============================================================================

/// Declares a SCREAMING_SNAKE_CASE string enum with `as_str` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Gender { Male => "MALE", Female => "FEMALE" });

string_enum!(UserType {
    Shelter => "SHELTER",
    Individual => "INDIVIDUAL",
    Organization => "ORGANIZATION",
});

string_enum!(Breed {
    Maltese => "MALTESE",
    GoldenRetriever => "GOLDEN_RETRIEVER",
    Labrador => "LABRADOR",
    Poodle => "POODLE",
    Bulldog => "BULLDOG",
    Beagle => "BEAGLE",
    Chihuahua => "CHIHUAHUA",
    ShihTzu => "SHIH_TZU",
    YorkshireTerrier => "YORKSHIRE_TERRIER",
    Dachshund => "DACHSHUND",
    Other => "OTHER",
});

string_enum!(
    /// Korean metropolitan cities and provinces.
    Region {
        Seoul => "SEOUL",
        Busan => "BUSAN",
        Daegu => "DAEGU",
        Incheon => "INCHEON",
        Gwangju => "GWANGJU",
        Daejeon => "DAEJEON",
        Ulsan => "ULSAN",
        Sejong => "SEJONG",
        Gyeonggi => "GYEONGGI",
        Gangwon => "GANGWON",
        Chungbuk => "CHUNGBUK",
        Chungnam => "CHUNGNAM",
        Jeonbuk => "JEONBUK",
        Jeonnam => "JEONNAM",
        Gyeongbuk => "GYEONGBUK",
        Gyeongnam => "GYEONGNAM",
        Jeju => "JEJU",
    }
);

string_enum!(DonationCategory {
    Surgery => "SURGERY",
    Treatment => "TREATMENT",
    Food => "FOOD",
    Shelter => "SHELTER",
    Emergency => "EMERGENCY",
    Other => "OTHER",
});

/// How the guardian's identity is verified: 1 SMS, 2 email, 3 both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VerificationMethod {
    Sms,
    #[default]
    Email,
    Both,
}

impl From<VerificationMethod> for u8 {
    fn from(value: VerificationMethod) -> Self {
        match value {
            VerificationMethod::Sms => 1,
            VerificationMethod::Email => 2,
            VerificationMethod::Both => 3,
        }
    }
}

impl TryFrom<u8> for VerificationMethod {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Sms),
            2 => Ok(Self::Email),
            3 => Ok(Self::Both),
            _ => Err(validation::INVALID_VERIFICATION_METHOD),
        }
    }
}

impl VerificationMethod {
    /// Parse form input; absent means email.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Self::default()),
            Some(value) => value
                .parse::<u8>()
                .map_err(|_| validation::INVALID_VERIFICATION_METHOD)
                .and_then(Self::try_from),
        }
    }
}

// =============================================================================
// Guardian registration
// =============================================================================

/// Body of `POST /api/guardian/register`.
///
/// Optional fields are omitted from the JSON when absent. The second call of a
/// signed registration is the same request with `signed_tx` set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuardianRegistrationRequest {
    pub email: String,
    #[schema(value_type = u8, example = 2)]
    pub verification_method: VerificationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_tx: Option<String>,
}

impl GuardianRegistrationRequest {
    pub fn new(email: &str, verification_method: VerificationMethod) -> Self {
        Self {
            email: email.trim().to_string(),
            verification_method,
            ..Self::default()
        }
    }

    pub fn with_signed_tx(&self, signed_tx: impl Into<String>) -> Self {
        Self {
            signed_tx: Some(signed_tx.into()),
            ..self.clone()
        }
    }
}

/// Trim an optional text field; blank input becomes `None`.
pub fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reply of `POST /api/guardian/register`.
///
/// Scalar fields are read leniently: ids may be numeric strings, flags may be
/// `null` or text, and a value of the wrong shape is treated as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationResponse {
    #[serde(deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub requires_signature: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_data: Option<TransactionData>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_id")]
    pub guardian_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_id")]
    pub auth_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub spring_job_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub error: Option<String>,
}

/// `true`, `"true"` or a non-zero number; anything else is `false`.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// An integer id sent as a number or as decimal text.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl RegistrationResponse {
    /// The backend wants the wallet to sign `transaction_data` first.
    pub fn signature_request(&self) -> Option<&TransactionData> {
        if self.requires_signature {
            self.transaction_data.as_ref()
        } else {
            None
        }
    }

    /// Failure message from `error`, then `message`, then `fallback`.
    pub fn failure_message(&self, fallback: &str) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// An EVM numeric field that may arrive as a JSON number, a decimal string or
/// a `0x` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    /// Numeric value. Blank text is `Ok(None)`.
    pub fn value(&self) -> Result<Option<u128>, std::num::ParseIntError> {
        match self {
            Quantity::Number(n) => Ok(Some(u128::from(*n))),
            Quantity::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u128::from_str_radix(hex, 16).map(Some),
                    None => text.parse().map(Some),
                }
            }
        }
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity::Number(value)
    }
}

/// Transaction the wallet must sign before registration can finish.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub to: String,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub wallet_address: String,
    #[serde(default)]
    pub did: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReissueResponse {
    pub access_token: String,
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// Cursor and page size sent as query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CursorQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

// =============================================================================
// Domain records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub pet_id: i64,
    #[serde(rename = "petDID")]
    pub pet_did: String,
    pub pet_name: String,
    pub breed: String,
    #[serde(default)]
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutered: Option<bool>,
    #[serde(default)]
    pub guardian_address: String,
    #[serde(default)]
    pub registered_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nose_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdoptionStatus {
    Available,
    Reserved,
    Adopted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionPost {
    pub adopt_id: i64,
    pub pet_id: i64,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub district: String,
    pub status: AdoptionStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub author_nickname: String,
}

// =============================================================================
// Domain requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub wallet_address: String,
    pub username: String,
    pub nickname: String,
    pub gender: Gender,
    pub old: i64,
    pub address: String,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetRegistrationRequest {
    pub did: String,
    pub pet_profile: String,
    pub pet_name: String,
    pub breed: Breed,
    pub old: i64,
    pub weight: f64,
    pub gender: Gender,
    pub color: String,
    pub feature: String,
    pub specifics: String,
    pub neutral: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionPostRequest {
    pub pet_id: i64,
    pub title: String,
    pub content: String,
    pub region: Region,
    pub district: String,
    pub shelter_name: String,
    pub contact: String,
    pub dead_line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationPostRequest {
    pub member_id: i64,
    pub pet_id: i64,
    pub title: String,
    pub target_amount: i64,
    pub deadline: String,
    pub category: DonationCategory,
    pub content: String,
    pub images: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MakeDonationRequest {
    pub member_id: i64,
    pub item_id: i64,
    pub donation_id: i64,
}

/// The `story` part of a daily or review story upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub title: String,
    pub content: String,
    pub pet_id: i64,
    pub member_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub story_id: i64,
    pub comment: String,
    pub member_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomRequest {
    pub target_id: i64,
    pub room_name: String,
    pub member_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparePaymentRequest {
    pub item_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePaymentRequest {
    pub order_id: String,
    pub payment_key: String,
    pub final_amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    #[test]
    fn wallet_address_rejects_malformed_input() {
        assert!(WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12").is_ok());
        assert_eq!(
            WalletAddress::parse("742d35Cc"),
            Err(validation::INVALID_WALLET_ADDRESS)
        );
        let parsed: Result<WalletAddress, _> = serde_json::from_value(json!("0x12"));
        assert!(parsed.is_err());
    }

    #[test]
    fn wallet_address_lowercases_for_headers() {
        let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12").unwrap();
        assert_eq!(addr.lowercase(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
        assert!(addr.matches("0x742D35CC6634C0532925A3B844BC9E7595F4AB12"));
    }

    #[test]
    fn envelope_serializes_null_result() {
        let msg = ActionMessage::from(validation::INVALID_EMAIL);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "isSuccess": false,
                "status": "400",
                "code": "INVALID_EMAIL",
                "message": "유효한 이메일 주소를 입력해주세요.",
                "result": null
            })
        );
    }

    #[tokio::test]
    async fn envelope_response_uses_embedded_status() {
        let response = ActionMessage::from(validation::MISSING_WALLET_ADDRESS).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "MISSING_WALLET_ADDRESS");
    }

    #[test]
    fn verification_method_defaults_to_email() {
        assert_eq!(VerificationMethod::parse(None), Ok(VerificationMethod::Email));
        assert_eq!(VerificationMethod::parse(Some("3")), Ok(VerificationMethod::Both));
        assert_eq!(
            VerificationMethod::parse(Some("4")),
            Err(validation::INVALID_VERIFICATION_METHOD)
        );
        assert_eq!(serde_json::to_value(VerificationMethod::Sms).unwrap(), json!(1));
    }

    #[test]
    fn registration_request_omits_empty_optionals() {
        let request = GuardianRegistrationRequest {
            name: trimmed(Some("  홍길동 ")),
            phone: trimmed(Some("   ")),
            ..GuardianRegistrationRequest::new(" user@example.com ", VerificationMethod::Email)
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "user@example.com", "verificationMethod": 2, "name": "홍길동"})
        );

        let signed = request.with_signed_tx("0xabc");
        assert_eq!(serde_json::to_value(&signed).unwrap()["signedTx"], "0xabc");
    }

    #[test]
    fn registration_response_reads_signature_request() {
        let response: RegistrationResponse = serde_json::from_value(json!({
            "requiresSignature": true,
            "transactionData": {
                "to": "0x0000000000000000000000000000000000000001",
                "data": "0x1234",
                "gasLimit": "0x7a120",
                "gasPrice": 0
            }
        }))
        .unwrap();
        let tx = response.signature_request().unwrap();
        assert_eq!(tx.gas_limit.as_ref().unwrap().value(), Ok(Some(500_000)));
        assert_eq!(tx.gas_price.as_ref().unwrap().value(), Ok(Some(0)));

        let plain: RegistrationResponse =
            serde_json::from_value(json!({"success": true, "guardianId": 7})).unwrap();
        assert!(plain.signature_request().is_none());
        assert_eq!(plain.guardian_id, Some(7));
    }

    #[test]
    fn registration_response_tolerates_loose_scalars() {
        let response: RegistrationResponse = serde_json::from_value(json!({
            "success": null,
            "requiresSignature": "false",
            "guardianId": "12",
            "authId": " 3 ",
            "txHash": null,
            "message": 500
        }))
        .unwrap();
        assert!(!response.success);
        assert!(response.signature_request().is_none());
        assert_eq!(response.guardian_id, Some(12));
        assert_eq!(response.auth_id, Some(3));
        assert_eq!(response.tx_hash, None);
        assert_eq!(response.message.as_deref(), Some("500"));

        let odd: RegistrationResponse =
            serde_json::from_value(json!({"success": "true", "guardianId": "abc"})).unwrap();
        assert!(odd.success);
        assert_eq!(odd.guardian_id, None);
    }

    #[test]
    fn string_enums_round_trip_through_text() {
        assert_eq!("SHIH_TZU".parse::<Breed>(), Ok(Breed::ShihTzu));
        assert!("shih_tzu".parse::<Breed>().is_err());
        assert_eq!(Region::ALL.len(), 17);
        assert_eq!(serde_json::to_value(DonationCategory::Emergency).unwrap(), json!("EMERGENCY"));
    }

    #[test]
    fn quantity_accepts_decimal_and_hex_text() {
        assert_eq!(Quantity::Text("21000".into()).value(), Ok(Some(21_000)));
        assert_eq!(Quantity::Text("0x5208".into()).value(), Ok(Some(21_000)));
        assert_eq!(Quantity::Text(" ".into()).value(), Ok(None));
        assert!(Quantity::Text("lots".into()).value().is_err());
    }
}
