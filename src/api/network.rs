// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{state::AppState, web3::NetworkConfig};

/// What a browser wallet needs to connect to the platform's chain.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(flatten)]
    pub network: NetworkConfig,
    /// `chainId` in the hex form used by `wallet_addEthereumChain`.
    pub chain_id_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walletconnect_project_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/network",
    tag = "Network",
    responses(
        (status = 200, description = "Chain and wallet connection settings", body = NetworkInfo)
    )
)]
pub async fn network_info(State(state): State<AppState>) -> Json<NetworkInfo> {
    let network = state.config.network.clone();
    Json(NetworkInfo {
        chain_id_hex: network.chain_id_hex(),
        network,
        walletconnect_project_id: state.config.walletconnect_project_id.clone(),
    })
}
