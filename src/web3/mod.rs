// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Wallet, signing and Web3Token support for the Besu network.

pub mod signing;
pub mod token;
pub mod types;
pub mod wallet;

pub use signing::{load_signer, pem_to_hex, WalletError};
pub use token::{
    generate_web3_token, optional_token, parse_expires_in, verify_web3_token, TokenError,
    Web3TokenManager, DEFAULT_EXPIRES_IN,
};
pub use types::NetworkConfig;
pub use wallet::{LocalWallet, WalletSigner, DEFAULT_GAS_LIMIT};
