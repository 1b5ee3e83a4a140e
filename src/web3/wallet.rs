// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Wallet capability used by tokens, sessions and the guardian flow.

use std::str::FromStr;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    signing::{load_signer, WalletError},
    types::NetworkConfig,
};
use crate::models::{Quantity, TransactionData};

/// Gas limit used when the backend does not supply one.
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

/// A connected wallet.
///
/// `sign_transaction` is optional: browser wallets commonly refuse it and
/// callers fall back to `send_transaction`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Checksummed address.
    fn address(&self) -> String;

    /// EIP-191 personal signature, `0x`-prefixed hex.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;

    /// Raw signed transaction, `0x`-prefixed hex.
    async fn sign_transaction(&self, _tx: &TransactionData) -> Result<String, WalletError> {
        Err(WalletError::Unsupported("signTransaction"))
    }

    /// Broadcast and return the transaction hash.
    async fn send_transaction(&self, tx: &TransactionData) -> Result<String, WalletError>;
}

/// Key-backed wallet talking to the configured Besu node.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    network: NetworkConfig,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner, network: NetworkConfig) -> Self {
        Self { signer, network }
    }

    /// Load from a hex or PEM private key.
    pub fn from_key(raw: &str, network: NetworkConfig) -> Result<Self, WalletError> {
        Ok(Self::new(load_signer(raw)?, network))
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }

    async fn pending_nonce(&self) -> Result<u64, WalletError> {
        let provider = ProviderBuilder::new().connect_http(self.network.rpc_url.clone());
        let nonce = provider
            .get_transaction_count(self.signer.address())
            .pending()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;
        debug!(nonce, "Fetched pending nonce");
        Ok(nonce)
    }

    /// Build the request, applying the platform defaults for missing gas,
    /// price and value. `nonce` is left to the caller.
    pub fn transaction_request(
        &self,
        tx: &TransactionData,
    ) -> Result<TransactionRequest, WalletError> {
        let to = Address::from_str(tx.to.trim())
            .map_err(|e| WalletError::InvalidTransaction(format!("to: {}", e)))?;
        let data = tx.data.trim();
        let input = alloy::hex::decode(data.strip_prefix("0x").unwrap_or(data))
            .map_err(|e| WalletError::InvalidTransaction(format!("data: {}", e)))?;

        let gas_limit = u64::try_from(quantity(&tx.gas_limit, "gasLimit")?.unwrap_or(0))
            .map_err(|_| WalletError::InvalidTransaction("gasLimit overflows u64".into()))?;
        let gas_limit = if gas_limit == 0 { DEFAULT_GAS_LIMIT } else { gas_limit };
        let gas_price = quantity(&tx.gas_price, "gasPrice")?.unwrap_or(0);
        let value = quantity(&tx.value, "value")?.unwrap_or(0);
        let chain_id = match quantity(&tx.chain_id, "chainId")? {
            Some(id) => u64::try_from(id)
                .map_err(|_| WalletError::InvalidTransaction("chainId overflows u64".into()))?,
            None => self.network.chain_id,
        };

        let mut request = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(to)
            .with_input(Bytes::from(input))
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price)
            .with_value(U256::from(value))
            .with_chain_id(chain_id);

        if let Some(nonce) = quantity(&tx.nonce, "nonce")? {
            let nonce = u64::try_from(nonce)
                .map_err(|_| WalletError::InvalidTransaction("nonce overflows u64".into()))?;
            request = request.with_nonce(nonce);
        }

        Ok(request)
    }
}

fn quantity(field: &Option<Quantity>, name: &str) -> Result<Option<u128>, WalletError> {
    match field {
        Some(q) => q
            .value()
            .map_err(|e| WalletError::InvalidTransaction(format!("{}: {}", name, e))),
        None => Ok(None),
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        Ok(format!("0x{}", alloy::hex::encode(signature.as_bytes())))
    }

    async fn sign_transaction(&self, tx: &TransactionData) -> Result<String, WalletError> {
        let mut request = self.transaction_request(tx)?;
        if request.nonce.is_none() {
            request = request.with_nonce(self.pending_nonce().await?);
        }

        let envelope = request
            .build(&self.ethereum_wallet())
            .await
            .map_err(|e| WalletError::Rejected(e.to_string()))?;

        info!(to = %tx.to, "Signed transaction");
        Ok(format!("0x{}", alloy::hex::encode(envelope.encoded_2718())))
    }

    async fn send_transaction(&self, tx: &TransactionData) -> Result<String, WalletError> {
        let request = self.transaction_request(tx)?;
        let provider = ProviderBuilder::new()
            .wallet(self.ethereum_wallet())
            .connect_http(self.network.rpc_url.clone());

        let pending = provider
            .send_transaction(request)
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        let tx_hash = pending.tx_hash().to_string();
        info!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }
}
