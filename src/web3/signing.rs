// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Private key loading for the server-side wallet.
//!
//! Keys arrive either as hex (with or without `0x`) or as PEM, in SEC1 or
//! PKCS#8 form.

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Wallet rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet does not support {0}")]
    Unsupported(&'static str),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("지갑을 연결해주세요")]
    NotConnected,
}

/// Extract the raw secret from a PEM key as lowercase hex (no `0x`).
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, WalletError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .map_err(|e| e.to_string())
        .or_else(|_| parse_pkcs8(pem.contents()))
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

pub fn signer_from_hex(private_key: &str) -> Result<PrivateKeySigner, WalletError> {
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let bytes = alloy::hex::decode(key)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid hex: {}", e)))?;

    PrivateKeySigner::from_slice(&bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid key: {}", e)))
}

pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, WalletError> {
    signer_from_hex(&pem_to_hex(pem_bytes)?)
}

/// Load a signer from either encoding.
pub fn load_signer(raw: &str) -> Result<PrivateKeySigner, WalletError> {
    if raw.trim_start().starts_with("-----BEGIN") {
        signer_from_pem(raw.as_bytes())
    } else {
        signer_from_hex(raw)
    }
}
