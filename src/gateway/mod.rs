// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Outbound calls to the API Gateway.
//!
//! - [`GatewayClient`]: raw requests plus the wallet-header calls
//!   (email verification, guardian registration)
//! - [`BearerClient`]: session calls with one-shot token refresh
//! - `services`: typed domain calls built on [`BearerClient`]

pub mod bearer;
pub mod client;
pub mod services;

pub use bearer::{BearerClient, LOGIN_PATH};
pub use client::{
    BackendReply, BackendRequest, GatewayClient, GatewayError, MultipartField, RequestBody,
    WalletHeaders, WALLET_ADDRESS_HEADER,
};
pub use services::{AdoptionFilter, ImageUpload, NewPet, StoryKind};
