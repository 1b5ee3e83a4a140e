// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Server Actions
//!
//! `POST /actions/...` endpoints. Each takes an `application/x-www-form-urlencoded`
//! body, validates it locally and forwards a JSON (or multipart) request to
//! the backend. The reply is always an [`ActionMessage`](crate::models::ActionMessage)
//! whose `status` is also the HTTP status.
//!
//! Form fields are read as text: absent and empty values are both missing.
//! Integer fields follow form semantics, so `0` and malformed numbers count
//! as missing in the presence check.

pub mod account;
pub mod community;
pub mod posts;
pub mod wallet;

use axum::{
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    error::ApiError,
    validation::{parse_int, present, ValidationError, MALFORMED_FORM},
};

/// [`Form`] whose rejection is an [`ActionMessage`](crate::models::ActionMessage)
/// envelope instead of axum's plain-text reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionForm<T>(pub T);

impl<T, S> FromRequest<S> for ActionForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => Err(form_rejection(&rejection)),
        }
    }
}

fn form_rejection(rejection: &FormRejection) -> ApiError {
    debug!(status = %rejection.status(), reason = %rejection.body_text(), "Form rejected");
    MALFORMED_FORM.into()
}

/// Form text; `None` when absent or empty.
pub(crate) fn text(raw: &Option<String>) -> Option<&str> {
    present(raw.as_deref())
}

/// Integer form field; `None` when absent, malformed or zero.
pub(crate) fn number(raw: &Option<String>) -> Option<i64> {
    parse_int(raw.as_deref()).filter(|n| *n != 0)
}

pub(crate) fn positive(value: i64, invalid: ValidationError) -> Result<i64, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(invalid)
    }
}

/// Serialise a validated request body.
pub(crate) fn json_body<T: Serialize>(request: &T) -> Result<Value, ApiError> {
    serde_json::to_value(request).map_err(|e| {
        error!(error = %e, "Failed to encode request body");
        ApiError::network()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::INVALID_PET_ID;

    #[test]
    fn numbers_follow_form_semantics() {
        assert_eq!(number(&Some("12".into())), Some(12));
        assert_eq!(number(&Some("0".into())), None);
        assert_eq!(number(&Some("abc".into())), None);
        assert_eq!(number(&Some("-3".into())), Some(-3));
        assert_eq!(number(&None), None);
    }

    #[test]
    fn empty_text_is_missing() {
        assert_eq!(text(&Some(String::new())), None);
        assert_eq!(text(&Some(" a ".into())), Some(" a "));
    }

    #[test]
    fn positive_rejects_negative_ids() {
        assert_eq!(positive(-1, INVALID_PET_ID), Err(INVALID_PET_ID));
        assert_eq!(positive(4, INVALID_PET_ID), Ok(4));
    }
}
