// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Web3Token: a wallet-signed, time-boxed bearer credential.
//!
//! The token is the standard base64 encoding of `{"signature","body"}` where
//! `body` is a line-oriented statement:
//!
//! ```text
//! Web3 Token Version: 2
//! Nonce: 48213907
//! Issued At: 2026-01-01T00:00:00.000Z
//! Expiration Time: 2026-01-02T00:00:00.000Z
//! ```
//!
//! The signature is an EIP-191 personal signature over `body`, so the
//! signer's address is recoverable without any server state.

use alloy::primitives::Signature;
use base64ct::{Base64, Encoding};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{signing::WalletError, wallet::WalletSigner};

pub const TOKEN_VERSION: &str = "2";
pub const DEFAULT_EXPIRES_IN: &str = "1d";

const VERSION_LABEL: &str = "Web3 Token Version";
const NONCE_LABEL: &str = "Nonce";
const ISSUED_AT_LABEL: &str = "Issued At";
const EXPIRATION_LABEL: &str = "Expiration Time";
const NOT_BEFORE_LABEL: &str = "Not Before";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(#[from] WalletError),

    #[error("Token is not valid base64")]
    Encoding,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Unsupported token version: {0}")]
    UnsupportedVersion(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    signature: String,
    body: String,
}

/// Parsed statement of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBody {
    pub version: String,
    pub nonce: u64,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    pub not_before: Option<DateTime<Utc>>,
}

/// Result of [`verify_web3_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Recovered signer, lowercase.
    pub address: String,
    pub body: TokenBody,
}

/// Parse `"<n><unit>"` where unit is `s`, `m`, `h` or `d`.
///
/// Anything else, including a non-numeric `n`, means one day.
pub fn parse_expires_in(expires_in: &str) -> Duration {
    let default = Duration::hours(24);
    let expires_in = expires_in.trim();
    let Some(unit) = expires_in.chars().last() else {
        return default;
    };
    let Ok(amount) = expires_in[..expires_in.len() - unit.len_utf8()].parse::<i64>() else {
        return default;
    };

    match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        _ => None,
    }
    .unwrap_or(default)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn random_nonce() -> u64 {
    (uuid::Uuid::new_v4().as_u128() % 100_000_000) as u64
}

pub async fn generate_web3_token(
    signer: &dyn WalletSigner,
    expires_in: &str,
) -> Result<String, TokenError> {
    generate_web3_token_at(signer, expires_in, Utc::now()).await
}

pub async fn generate_web3_token_at(
    signer: &dyn WalletSigner,
    expires_in: &str,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let expiration = now + parse_expires_in(expires_in);
    let body = [
        format!("{}: {}", VERSION_LABEL, TOKEN_VERSION),
        format!("{}: {}", NONCE_LABEL, random_nonce()),
        format!("{}: {}", ISSUED_AT_LABEL, timestamp(now)),
        format!("{}: {}", EXPIRATION_LABEL, timestamp(expiration)),
    ]
    .join("\n");

    let signature = signer.sign_message(&body).await?;
    let envelope = serde_json::to_vec(&Envelope { signature, body })
        .map_err(|e| TokenError::Malformed(e.to_string()))?;

    Ok(Base64::encode_string(&envelope))
}

pub fn verify_web3_token(token: &str) -> Result<VerifiedToken, TokenError> {
    verify_web3_token_at(token, Utc::now())
}

pub fn verify_web3_token_at(token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
    let raw = Base64::decode_vec(token.trim()).map_err(|_| TokenError::Encoding)?;
    let envelope: Envelope =
        serde_json::from_slice(&raw).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let signature_bytes =
        alloy::hex::decode(&envelope.signature).map_err(|_| TokenError::InvalidSignature)?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|_| TokenError::InvalidSignature)?;
    let address = signature
        .recover_address_from_msg(envelope.body.as_bytes())
        .map_err(|_| TokenError::InvalidSignature)?;

    let body = parse_body(&envelope.body)?;
    if body.version != TOKEN_VERSION {
        return Err(TokenError::UnsupportedVersion(body.version));
    }
    if body.expiration_time <= now {
        return Err(TokenError::Expired);
    }
    if body.not_before.is_some_and(|nbf| nbf > now) {
        return Err(TokenError::NotYetValid);
    }

    Ok(VerifiedToken {
        address: address.to_string().to_lowercase(),
        body,
    })
}

fn parse_body(body: &str) -> Result<TokenBody, TokenError> {
    let mut version = None;
    let mut nonce = None;
    let mut issued_at = None;
    let mut expiration_time = None;
    let mut not_before = None;

    for line in body.lines() {
        let Some((label, value)) = line.split_once(": ") else {
            continue;
        };
        match label {
            VERSION_LABEL => version = Some(value.to_string()),
            NONCE_LABEL => {
                nonce = Some(
                    value
                        .parse()
                        .map_err(|_| TokenError::Malformed("nonce".into()))?,
                )
            }
            ISSUED_AT_LABEL => issued_at = Some(parse_time(value, "issued at")?),
            EXPIRATION_LABEL => expiration_time = Some(parse_time(value, "expiration time")?),
            NOT_BEFORE_LABEL => not_before = Some(parse_time(value, "not before")?),
            _ => {}
        }
    }

    let missing = |field: &str| TokenError::Malformed(format!("missing {}", field));
    Ok(TokenBody {
        version: version.ok_or_else(|| missing("version"))?,
        nonce: nonce.ok_or_else(|| missing("nonce"))?,
        issued_at: issued_at.ok_or_else(|| missing("issued at"))?,
        expiration_time: expiration_time.ok_or_else(|| missing("expiration time"))?,
        not_before,
    })
}

fn parse_time(value: &str, field: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| TokenError::Malformed(field.to_string()))
}

struct CachedToken {
    /// Lower-cased address of the signer the token was minted for.
    address: String,
    token: String,
    expires_at: DateTime<Utc>,
}

/// Process-wide token cache.
///
/// The cached token is reused until its local expiry passes, and only for
/// the signer it was minted for. A different signer replaces it. The lock is
/// held while signing so concurrent callers share a single wallet prompt.
#[derive(Default)]
pub struct Web3TokenManager {
    cached: Mutex<Option<CachedToken>>,
}

impl Web3TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_token(
        &self,
        signer: &dyn WalletSigner,
        expires_in: &str,
    ) -> Result<String, TokenError> {
        self.get_token_at(signer, expires_in, Utc::now()).await
    }

    pub async fn get_token_at(
        &self,
        signer: &dyn WalletSigner,
        expires_in: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let address = signer.address().to_lowercase();
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.address == address && now < entry.expires_at {
                return Ok(entry.token.clone());
            }
        }
        *cached = None;

        debug!(%address, "Generating Web3Token");
        let token = generate_web3_token_at(signer, expires_in, now).await?;
        *cached = Some(CachedToken {
            address,
            token: token.clone(),
            expires_at: now + parse_expires_in(expires_in),
        });
        Ok(token)
    }

    /// Forget the cached token. A failed generation leaves the cache empty
    /// as well, so the next call signs again.
    pub async fn clear_token(&self) {
        *self.cached.lock().await = None;
    }
}

/// Collapse a token attempt into an optional header value.
///
/// Calls that may proceed without a token use this so the failure is still
/// visible in the logs.
pub fn optional_token(result: Result<String, TokenError>) -> Option<String> {
    match result {
        Ok(token) => Some(token),
        Err(error) => {
            warn!(%error, "Continuing without Web3Token");
            None
        }
    }
}
