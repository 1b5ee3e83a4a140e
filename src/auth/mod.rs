// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Request Credentials
//!
//! Browser callers authenticate in one of two ways:
//!
//! 1. Before login, wallet actions send `walletaddress` and, when the wallet
//!    produced one, a Web3Token in `authorization`.
//! 2. After login, session routes send `authorization: Bearer <accessToken>`.
//!
//! This module only extracts those values. Tokens are checked by the API
//! Gateway the request is forwarded to.

pub mod error;
pub mod extractor;

pub use error::AuthError;
pub use extractor::{BearerAuth, ForwardedAuthorization, WalletAuth};
