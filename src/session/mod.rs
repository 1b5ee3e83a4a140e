// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Session credentials and lifecycle.

pub mod manager;
pub mod store;

pub use manager::{AuthService, SessionError, SessionManager, SessionState};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, StoreError, VerifiedEmailMarker, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY, VERIFIED_EMAIL_KEY, WALLET_ADDRESS_KEY,
};
