// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! DogCatPaw Server - Wallet-authenticated API proxy and client core
//!
//! Fronts the DogCatPaw API Gateway for the pet identity platform. Browser
//! calls are validated locally, sent on with the wallet or session headers
//! the gateway expects, and every reply is normalised into one envelope.
//!
//! ## Modules
//!
//! - `api` - HTTP surface (Axum): server actions, route handlers, health
//! - `auth` - Wallet and bearer credential extraction
//! - `gateway` - Outbound client for the API Gateway and its domain calls
//! - `web3` - Web3Token signing and the wallet abstraction
//! - `session` - Access/refresh token lifecycle over a key-value store
//! - `flows` - Email verification and guardian registration state machines

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod session;
pub mod state;
pub mod validation;
pub mod web3;
