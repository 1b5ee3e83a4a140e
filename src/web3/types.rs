// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Network description shared by the wallet and the public config endpoint.

use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

pub const BESU_NETWORK_NAME: &str = "Besu Local Network";
pub const BESU_CHAIN_ID: u64 = 1337;
pub const BESU_RPC_URL: &str = "http://localhost:8545";
pub const BESU_EXPLORER_URL: &str = "http://localhost:4000";

/// EVM chain the platform's contracts live on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    #[schema(value_type = String, example = "http://localhost:8545")]
    pub rpc_url: Url,
    #[schema(value_type = String, example = "http://localhost:4000")]
    pub explorer_url: Url,
}

impl NetworkConfig {
    pub fn besu(chain_id: u64, rpc_url: Url, explorer_url: Url) -> Self {
        Self {
            name: BESU_NETWORK_NAME.to_string(),
            chain_id,
            rpc_url,
            explorer_url,
        }
    }

    #[cfg(test)]
    pub(crate) fn besu_local() -> Self {
        Self::besu(
            BESU_CHAIN_ID,
            Url::parse(BESU_RPC_URL).unwrap(),
            Url::parse(BESU_EXPLORER_URL).unwrap(),
        )
    }

    /// Explorer page for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!(
            "{}/tx/{}",
            self.explorer_url.as_str().trim_end_matches('/'),
            tx_hash
        )
    }

    /// Hex chain id as wallets expect it in `wallet_addEthereumChain`.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}
