// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Local Validation
//!
//! Every request is validated here before anything is sent to the API
//! Gateway. A failed rule is a [`ValidationError`]: a stable machine code,
//! the Korean message shown to the user and the HTTP status it maps to.
//!
//! Rules are checked in a fixed order: presence first, then format. So an
//! empty email reports `MISSING_EMAIL` even when the wallet is also
//! malformed.

use axum::http::StatusCode;
use chrono::NaiveDate;

/// A local validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: &'static str,
    pub status: StatusCode,
}

impl ValidationError {
    pub const fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self {
            code,
            message,
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub const fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self {
            code,
            message,
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

/// Body that is not a decodable urlencoded form.
pub const MALFORMED_FORM: ValidationError =
    ValidationError::bad_request("VALIDATION_ERROR", "요청 형식이 올바르지 않습니다.");

// =============================================================================
// Wallet, email and verification code
// =============================================================================

pub const MISSING_EMAIL: ValidationError =
    ValidationError::bad_request("MISSING_EMAIL", "이메일 주소를 입력해주세요.");
pub const MISSING_GUARDIAN_EMAIL: ValidationError =
    ValidationError::bad_request("MISSING_EMAIL", "이메일은 필수 항목입니다.");
pub const MISSING_WALLET_ADDRESS: ValidationError =
    ValidationError::unauthorized("MISSING_WALLET_ADDRESS", "지갑 주소가 필요합니다.");
pub const MISSING_LOGIN_WALLET_ADDRESS: ValidationError =
    ValidationError::bad_request("MISSING_WALLET_ADDRESS", "지갑 주소를 입력해주세요.");
pub const INVALID_EMAIL: ValidationError =
    ValidationError::bad_request("INVALID_EMAIL", "유효한 이메일 주소를 입력해주세요.");
pub const INVALID_WALLET_ADDRESS: ValidationError =
    ValidationError::bad_request("INVALID_WALLET_ADDRESS", "유효한 지갑 주소를 입력해주세요.");
pub const MISSING_CODE: ValidationError =
    ValidationError::bad_request("MISSING_CODE", "인증 코드를 입력해주세요.");
pub const INVALID_CODE_LENGTH: ValidationError =
    ValidationError::bad_request("INVALID_CODE_LENGTH", "인증 코드는 6자리여야 합니다.");
pub const INVALID_CODE_FORMAT: ValidationError =
    ValidationError::bad_request("INVALID_CODE_FORMAT", "인증 코드는 숫자만 입력 가능합니다.");

// =============================================================================
// Profile fields
// =============================================================================

pub const MISSING_REQUIRED_FIELDS: ValidationError =
    ValidationError::bad_request("MISSING_REQUIRED_FIELDS", "모든 필수 필드를 입력해주세요.");
pub const INVALID_NAME: ValidationError =
    ValidationError::bad_request("INVALID_NAME", "이름은 2-50자 사이여야 합니다.");
pub const INVALID_PHONE: ValidationError =
    ValidationError::bad_request("INVALID_PHONE", "유효한 전화번호를 입력해주세요.");
pub const INVALID_PHONE_NUMBER: ValidationError =
    ValidationError::bad_request("INVALID_PHONE_NUMBER", "유효한 전화번호를 입력해주세요.");
pub const INVALID_VERIFICATION_METHOD: ValidationError = ValidationError::bad_request(
    "INVALID_VERIFICATION_METHOD",
    "인증 방법이 유효하지 않습니다. (1: SMS, 2: Email, 3: Both)",
);
pub const INVALID_GENDER: ValidationError =
    ValidationError::bad_request("INVALID_GENDER", "성별은 MALE 또는 FEMALE이어야 합니다.");
pub const INVALID_AGE: ValidationError =
    ValidationError::bad_request("INVALID_AGE", "나이는 0-150 사이여야 합니다.");
pub const INVALID_PET_AGE: ValidationError =
    ValidationError::bad_request("INVALID_AGE", "나이는 0 이상이어야 합니다.");
pub const INVALID_USERNAME: ValidationError =
    ValidationError::bad_request("INVALID_USERNAME", "사용자명은 3-20자 사이여야 합니다.");
pub const INVALID_NICKNAME: ValidationError =
    ValidationError::bad_request("INVALID_NICKNAME", "닉네임은 2-15자 사이여야 합니다.");
pub const INVALID_TYPE: ValidationError = ValidationError::bad_request(
    "INVALID_TYPE",
    "유형은 SHELTER, INDIVIDUAL, ORGANIZATION 중 하나여야 합니다.",
);

// =============================================================================
// Pets, adoption and donation posts
// =============================================================================

pub const INVALID_WEIGHT: ValidationError =
    ValidationError::bad_request("INVALID_WEIGHT", "몸무게는 0보다 커야 합니다.");
pub const INVALID_BREED: ValidationError =
    ValidationError::bad_request("INVALID_BREED", "유효하지 않은 품종입니다.");
pub const INVALID_PET_ID: ValidationError =
    ValidationError::bad_request("INVALID_PET_ID", "유효한 반려동물 ID가 필요합니다.");
pub const EMPTY_TITLE: ValidationError =
    ValidationError::bad_request("EMPTY_TITLE", "제목을 입력해주세요.");
pub const TITLE_TOO_LONG: ValidationError =
    ValidationError::bad_request("TITLE_TOO_LONG", "제목은 100자 이하로 입력해주세요.");
pub const EMPTY_CONTENT: ValidationError =
    ValidationError::bad_request("EMPTY_CONTENT", "내용을 입력해주세요.");
pub const CONTENT_TOO_LONG: ValidationError =
    ValidationError::bad_request("CONTENT_TOO_LONG", "내용은 2000자 이하로 입력해주세요.");
pub const INVALID_DATE_FORMAT: ValidationError =
    ValidationError::bad_request("INVALID_DATE_FORMAT", "날짜는 YYYY-MM-DD 형식이어야 합니다.");
pub const INVALID_DEADLINE: ValidationError =
    ValidationError::bad_request("INVALID_DEADLINE", "마감일은 오늘 이후여야 합니다.");
pub const INVALID_REGION: ValidationError =
    ValidationError::bad_request("INVALID_REGION", "유효하지 않은 지역입니다.");
pub const INVALID_CONTACT: ValidationError =
    ValidationError::bad_request("INVALID_CONTACT", "유효한 연락처를 입력해주세요.");
pub const INVALID_MEMBER_ID: ValidationError =
    ValidationError::bad_request("INVALID_MEMBER_ID", "유효한 회원 ID가 필요합니다.");
pub const INVALID_TARGET_AMOUNT: ValidationError =
    ValidationError::bad_request("INVALID_TARGET_AMOUNT", "목표 금액은 0보다 커야 합니다.");
pub const INVALID_CATEGORY: ValidationError =
    ValidationError::bad_request("INVALID_CATEGORY", "유효하지 않은 카테고리입니다.");
pub const MISSING_DONATION_FIELDS: ValidationError = ValidationError::bad_request(
    "MISSING_REQUIRED_FIELDS",
    "memberId, itemId, donationId는 필수 항목입니다.",
);
pub const INVALID_ITEM_ID: ValidationError =
    ValidationError::bad_request("INVALID_ITEM_ID", "유효한 아이템 ID가 필요합니다.");
pub const INVALID_DONATION_ID: ValidationError =
    ValidationError::bad_request("INVALID_DONATION_ID", "유효한 후원 ID가 필요합니다.");
pub const INVALID_PAYMENT_ITEM_ID: ValidationError =
    ValidationError::bad_request("INVALID_ITEM_ID", "유효한 itemId가 필요합니다.");
pub const MISSING_PAYMENT_FIELDS: ValidationError = ValidationError::bad_request(
    "MISSING_REQUIRED_FIELDS",
    "orderId, paymentKey, finalAmount는 필수 항목입니다.",
);

// =============================================================================
// Stories, comments, likes and chat
// =============================================================================

pub const MISSING_STORY_FIELDS: ValidationError = ValidationError::bad_request(
    "MISSING_REQUIRED_FIELDS",
    "제목, 내용, 반려동물 ID, 회원명은 필수 항목입니다.",
);
pub const MISSING_COMMENT_FIELDS: ValidationError = ValidationError::bad_request(
    "MISSING_REQUIRED_FIELDS",
    "storyId, comment, memberId는 필수 항목입니다.",
);
pub const MISSING_LIKE_FIELDS: ValidationError =
    ValidationError::bad_request("MISSING_REQUIRED_FIELDS", "storyId와 memberId는 필수 항목입니다.");
pub const INVALID_STORY_ID: ValidationError =
    ValidationError::bad_request("INVALID_STORY_ID", "유효한 스토리 ID가 필요합니다.");
pub const EMPTY_COMMENT: ValidationError =
    ValidationError::bad_request("EMPTY_COMMENT", "댓글 내용을 입력해주세요.");
pub const COMMENT_TOO_LONG: ValidationError =
    ValidationError::bad_request("COMMENT_TOO_LONG", "댓글은 1000자 이하로 입력해주세요.");
pub const MISSING_CHAT_FIELDS: ValidationError = ValidationError::bad_request(
    "MISSING_REQUIRED_FIELDS",
    "targetId, roomName, memberId는 필수 항목입니다.",
);
pub const INVALID_TARGET_ID: ValidationError =
    ValidationError::bad_request("INVALID_TARGET_ID", "유효한 대상 ID가 필요합니다.");
pub const EMPTY_ROOM_NAME: ValidationError =
    ValidationError::bad_request("EMPTY_ROOM_NAME", "채팅방 이름을 입력해주세요.");
pub const ROOM_NAME_TOO_LONG: ValidationError =
    ValidationError::bad_request("ROOM_NAME_TOO_LONG", "채팅방 이름은 100자 이하로 입력해주세요.");
pub const INVALID_TARGET: ValidationError =
    ValidationError::bad_request("INVALID_TARGET", "자기 자신과는 채팅방을 생성할 수 없습니다.");

// =============================================================================
// Route handler query parameters
// =============================================================================

pub const INVALID_SIZE: ValidationError =
    ValidationError::bad_request("INVALID_SIZE", "size는 1-50 사이의 숫자여야 합니다.");
pub const INVALID_CURSOR: ValidationError =
    ValidationError::bad_request("INVALID_CURSOR", "cursor는 양수여야 합니다.");
pub const INVALID_CURSOR_ID: ValidationError =
    ValidationError::bad_request("INVALID_CURSOR", "cursorId는 양수여야 합니다.");
pub const MISSING_DONATION_ID: ValidationError =
    ValidationError::bad_request("MISSING_DONATION_ID", "donationId는 필수 항목입니다.");
pub const INVALID_DONATION_ID_PARAM: ValidationError =
    ValidationError::bad_request("INVALID_DONATION_ID", "유효한 donationId가 필요합니다.");
pub const MISSING_STORY_ID: ValidationError =
    ValidationError::bad_request("MISSING_STORY_ID", "storyId는 필수 항목입니다.");
pub const INVALID_STORY_ID_PARAM: ValidationError =
    ValidationError::bad_request("INVALID_STORY_ID", "유효한 storyId가 필요합니다.");
pub const INVALID_DAILY_STORY_ID: ValidationError =
    ValidationError::bad_request("INVALID_STORY_ID", "유효한 일지 ID가 필요합니다.");
pub const INVALID_REVIEW_ID: ValidationError =
    ValidationError::bad_request("INVALID_REVIEW_ID", "유효한 후기 ID가 필요합니다.");
pub const MISSING_KEYWORD: ValidationError =
    ValidationError::bad_request("MISSING_KEYWORD", "검색 키워드를 입력해주세요.");
pub const EMPTY_KEYWORD: ValidationError =
    ValidationError::bad_request("EMPTY_KEYWORD", "검색 키워드를 입력해주세요.");
pub const KEYWORD_TOO_LONG: ValidationError =
    ValidationError::bad_request("KEYWORD_TOO_LONG", "검색 키워드는 100자 이하로 입력해주세요.");
pub const MISSING_ROOM_ID: ValidationError =
    ValidationError::bad_request("MISSING_ROOM_ID", "roomId는 필수 항목입니다.");
pub const INVALID_ROOM_ID: ValidationError =
    ValidationError::bad_request("INVALID_ROOM_ID", "유효한 roomId가 필요합니다.");
pub const MISSING_AUTHORIZATION: ValidationError =
    ValidationError::unauthorized("MISSING_AUTHORIZATION", "로그인이 필요합니다.");

/// Largest page a list endpoint may request.
pub const MAX_PAGE_SIZE: u32 = 50;

// =============================================================================
// Predicates
// =============================================================================

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// `0x` followed by 40 hex digits.
pub fn is_valid_wallet_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Digits, `-`, `+`, whitespace and parentheses only; at least 10 characters.
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty()
        && phone.chars().count() >= 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '(' | ')') || c.is_whitespace())
}

/// Character-count range check, inclusive on both ends.
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len)
}

/// Parse an integer field. Blank or malformed input yields `None`.
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Parse a decimal field. Blank or malformed input yields `None`.
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Presence check for form text: `None` and the empty string are missing.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.is_empty())
}

// =============================================================================
// Composite rules
// =============================================================================

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(INVALID_EMAIL)
    }
}

pub fn validate_wallet_address(address: &str) -> Result<(), ValidationError> {
    if is_valid_wallet_address(address) {
        Ok(())
    } else {
        Err(INVALID_WALLET_ADDRESS)
    }
}

/// A verification code is exactly six ASCII digits.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(MISSING_CODE);
    }
    if code.chars().count() != 6 {
        return Err(INVALID_CODE_LENGTH);
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(INVALID_CODE_FORMAT);
    }
    Ok(())
}

/// Rules for `POST /email/send-code`.
pub fn validate_send_code(email: &str, wallet_address: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(MISSING_EMAIL);
    }
    if wallet_address.is_empty() {
        return Err(MISSING_WALLET_ADDRESS);
    }
    validate_email(email)?;
    validate_wallet_address(wallet_address)
}

/// Rules for `POST /email/verify-code`.
pub fn validate_verify_code(code: &str, wallet_address: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(MISSING_CODE);
    }
    if wallet_address.is_empty() {
        return Err(MISSING_WALLET_ADDRESS);
    }
    validate_code(code)?;
    validate_wallet_address(wallet_address)
}

/// Page size with a per-endpoint default; must be 1 to 50.
pub fn parse_page_size(raw: Option<&str>, default: u32) -> Result<u32, ValidationError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(size) if size > 0 && size <= i64::from(MAX_PAGE_SIZE) => Ok(size as u32),
            _ => Err(INVALID_SIZE),
        },
    }
}

/// Optional cursor; when present it must be a positive integer.
pub fn parse_cursor(
    raw: Option<&str>,
    invalid: ValidationError,
) -> Result<Option<i64>, ValidationError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => match value.parse::<i64>() {
            Ok(cursor) if cursor > 0 => Ok(Some(cursor)),
            _ => Err(invalid),
        },
    }
}

/// Required positive id taken from a query string or path segment.
pub fn parse_required_id(
    raw: Option<&str>,
    missing: ValidationError,
    invalid: ValidationError,
) -> Result<i64, ValidationError> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or(missing)?;
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid),
    }
}

/// `YYYY-MM-DD`, strictly after `today`.
pub fn validate_future_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let shaped = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shaped {
        return Err(INVALID_DATE_FORMAT);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| INVALID_DATE_FORMAT)?;
    if date <= today {
        return Err(INVALID_DEADLINE);
    }
    Ok(date)
}

/// Parse a fixed-vocabulary field such as a breed or region.
pub fn parse_enum<T: std::str::FromStr>(
    raw: &str,
    invalid: ValidationError,
) -> Result<T, ValidationError> {
    raw.parse().map_err(|_| invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12";

    #[test]
    fn email_shape_follows_simple_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b@sub.domain.kr"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn wallet_address_needs_prefix_length_and_hex() {
        assert!(is_valid_wallet_address(WALLET));
        assert!(!is_valid_wallet_address(&WALLET[2..]));
        assert!(!is_valid_wallet_address("0x1234"));
        assert!(!is_valid_wallet_address(
            "0xZZ2d35Cc6634C0532925a3b844Bc9e7595f4aB12"
        ));
        assert!(!is_valid_wallet_address(&format!("{WALLET}0")));
    }

    #[test]
    fn code_must_be_six_digits() {
        assert_eq!(validate_code("12345"), Err(INVALID_CODE_LENGTH));
        assert_eq!(validate_code("12345a"), Err(INVALID_CODE_FORMAT));
        assert_eq!(validate_code("1234567"), Err(INVALID_CODE_LENGTH));
        assert_eq!(validate_code(""), Err(MISSING_CODE));
        assert_eq!(validate_code("123456"), Ok(()));
    }

    #[test]
    fn presence_is_checked_before_format() {
        assert_eq!(validate_send_code("", "bogus"), Err(MISSING_EMAIL));
        assert_eq!(validate_send_code("bad", ""), Err(MISSING_WALLET_ADDRESS));
        assert_eq!(validate_send_code("bad", "bogus"), Err(INVALID_EMAIL));
        assert_eq!(
            validate_send_code("user@example.com", "bogus"),
            Err(INVALID_WALLET_ADDRESS)
        );
        assert_eq!(validate_send_code("user@example.com", WALLET), Ok(()));

        assert_eq!(validate_verify_code("", ""), Err(MISSING_CODE));
        assert_eq!(validate_verify_code("1", ""), Err(MISSING_WALLET_ADDRESS));
        assert_eq!(validate_verify_code("1", "bogus"), Err(INVALID_CODE_LENGTH));
        assert_eq!(
            validate_verify_code("123456", "bogus"),
            Err(INVALID_WALLET_ADDRESS)
        );
    }

    #[test]
    fn missing_wallet_is_unauthorized() {
        assert_eq!(MISSING_WALLET_ADDRESS.status, StatusCode::UNAUTHORIZED);
        assert_eq!(INVALID_WALLET_ADDRESS.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn phone_accepts_common_punctuation() {
        assert!(is_valid_phone("010-1234-5678"));
        assert!(is_valid_phone("+82 (10) 1234 5678"));
        assert!(!is_valid_phone("010-123"));
        assert!(!is_valid_phone("010-1234-abcd"));
    }

    #[test]
    fn page_size_and_cursor_rules() {
        assert_eq!(parse_page_size(None, 9), Ok(9));
        assert_eq!(parse_page_size(Some(""), 5), Ok(5));
        assert_eq!(parse_page_size(Some("50"), 9), Ok(50));
        assert_eq!(parse_page_size(Some("0"), 9), Err(INVALID_SIZE));
        assert_eq!(parse_page_size(Some("51"), 9), Err(INVALID_SIZE));
        assert_eq!(parse_page_size(Some("ten"), 9), Err(INVALID_SIZE));

        assert_eq!(parse_cursor(None, INVALID_CURSOR), Ok(None));
        assert_eq!(parse_cursor(Some("12"), INVALID_CURSOR), Ok(Some(12)));
        assert_eq!(parse_cursor(Some("-1"), INVALID_CURSOR_ID), Err(INVALID_CURSOR_ID));
        assert_eq!(parse_cursor(Some("x"), INVALID_CURSOR), Err(INVALID_CURSOR));
    }

    #[test]
    fn required_ids_distinguish_missing_from_invalid() {
        assert_eq!(
            parse_required_id(None, MISSING_ROOM_ID, INVALID_ROOM_ID),
            Err(MISSING_ROOM_ID)
        );
        assert_eq!(
            parse_required_id(Some("0"), MISSING_ROOM_ID, INVALID_ROOM_ID),
            Err(INVALID_ROOM_ID)
        );
        assert_eq!(
            parse_required_id(Some("7"), MISSING_ROOM_ID, INVALID_ROOM_ID),
            Ok(7)
        );
    }

    #[test]
    fn deadline_must_be_after_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(validate_future_date("2026/03/11", today), Err(INVALID_DATE_FORMAT));
        assert_eq!(validate_future_date("2026-02-30", today), Err(INVALID_DATE_FORMAT));
        assert_eq!(validate_future_date("2026-03-10", today), Err(INVALID_DEADLINE));
        assert_eq!(
            validate_future_date("2026-03-11", today),
            Ok(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap())
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert!(length_between("홍길", 2, 50));
        assert!(!length_between("홍", 2, 50));
        assert_eq!(parse_int(Some(" 42 ")), Some(42));
        assert_eq!(parse_int(Some("4x")), None);
        assert_eq!(parse_decimal(Some("3.5")), Some(3.5));
        assert_eq!(present(Some("")), None);
    }
}
