// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Session lifecycle: login, rehydration and invalidation.
//!
//! ```text
//! Unauthenticated --login--> Authenticated --logout / wallet disconnect--> Unauthenticated
//! ```
//!
//! Stored credentials are only trusted while the saved wallet address
//! matches the connected wallet.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::store::{
    KeyValueStore, StoreError, ACCESS_TOKEN_KEY, CREDENTIAL_KEYS, REFRESH_TOKEN_KEY,
    WALLET_ADDRESS_KEY,
};
use crate::{
    gateway::GatewayError,
    models::{AuthResponse, User},
    web3::{WalletError, WalletSigner},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Credential storage failed: {0}")]
    Store(#[from] StoreError),
}

/// Backend calls the session depends on.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn current_user(&self, wallet_address: &str) -> Result<User, GatewayError>;
    async fn login_with_vp(
        &self,
        wallet_address: &str,
        vp_jwt: &str,
    ) -> Result<AuthResponse, GatewayError>;
    async fn logout(&self) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(User),
}

/// Message the wallet signs to log in.
pub fn login_message(address: &str, timestamp_ms: i64) -> String {
    format!(
        "Login to DogCatPaw\nAddress: {}\nTimestamp: {}",
        address, timestamp_ms
    )
}

/// Stand-in presentation until the backend issues real VPs.
pub fn placeholder_vp_jwt(signature: &str) -> String {
    format!("placeholder_vp_jwt_{}", signature)
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    auth: Arc<dyn AuthService>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// A fresh, unauthenticated session over existing storage.
    pub fn create(store: Arc<dyn KeyValueStore>, auth: Arc<dyn AuthService>) -> Self {
        Self {
            store,
            auth,
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        match &*self.state.read().await {
            SessionState::Authenticated(user) => Some(user.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Authenticated(_))
    }

    pub fn access_token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?)
    }

    /// Restore a stored session for the connected wallet.
    ///
    /// Any missing credential, address mismatch or failed user fetch clears
    /// storage and leaves the session unauthenticated.
    pub async fn rehydrate(
        &self,
        connected: Option<&dyn WalletSigner>,
    ) -> Result<SessionState, SessionError> {
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        let saved = self.store.get(WALLET_ADDRESS_KEY)?;

        let (Some(_), Some(saved), Some(wallet)) = (token, saved, connected) else {
            self.invalidate().await?;
            return Ok(SessionState::Unauthenticated);
        };

        if !saved.eq_ignore_ascii_case(&wallet.address()) {
            warn!("Stored wallet does not match connected wallet, clearing session");
            self.invalidate().await?;
            return Ok(SessionState::Unauthenticated);
        }

        match self.auth.current_user(&saved).await {
            Ok(user) => {
                info!("Session rehydrated");
                *self.state.write().await = SessionState::Authenticated(user.clone());
                Ok(SessionState::Authenticated(user))
            }
            Err(error) => {
                warn!(%error, "Session rehydration failed");
                self.invalidate().await?;
                Ok(SessionState::Unauthenticated)
            }
        }
    }

    pub async fn login(&self, wallet: Option<&dyn WalletSigner>) -> Result<User, SessionError> {
        let wallet = wallet.ok_or(SessionError::WalletNotConnected)?;
        let address = wallet.address();

        let message = login_message(&address, Utc::now().timestamp_millis());
        let signature = wallet.sign_message(&message).await?;
        let response = self
            .auth
            .login_with_vp(&address, &placeholder_vp_jwt(&signature))
            .await?;

        self.store.set(ACCESS_TOKEN_KEY, &response.access_token)?;
        if let Some(refresh) = &response.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        self.store.set(WALLET_ADDRESS_KEY, &address)?;

        info!(wallet = %address, "Logged in");
        *self.state.write().await = SessionState::Authenticated(response.user.clone());
        Ok(response.user)
    }

    /// Clears local state even when the backend call fails.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Err(error) = self.auth.logout().await {
            warn!(%error, "Backend logout failed");
        }
        self.invalidate().await?;
        info!("Logged out");
        Ok(())
    }

    /// Drop stored credentials and the in-memory user.
    pub async fn invalidate(&self) -> Result<(), SessionError> {
        *self.state.write().await = SessionState::Unauthenticated;
        self.store.remove_all(&CREDENTIAL_KEYS)?;
        Ok(())
    }

    pub async fn on_wallet_disconnected(&self) -> Result<(), SessionError> {
        if self.is_authenticated().await {
            info!("Wallet disconnected, logging out");
            self.logout().await?;
        }
        Ok(())
    }

    /// Re-fetch the current user. On failure the user is dropped, stored
    /// credentials are left for the Bearer client to refresh.
    pub async fn refresh_user(&self) -> Result<Option<User>, SessionError> {
        let Some(address) = self.store.get(WALLET_ADDRESS_KEY)? else {
            return Ok(None);
        };

        match self.auth.current_user(&address).await {
            Ok(user) => {
                *self.state.write().await = SessionState::Authenticated(user.clone());
                Ok(Some(user))
            }
            Err(error) => {
                warn!(%error, "Failed to refresh user");
                *self.state.write().await = SessionState::Unauthenticated;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        error::BackendErrorBody,
        session::store::MemoryStore,
        web3::token::tests::CountingSigner,
    };
    use axum::http::StatusCode;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn user() -> User {
        User {
            wallet_address: ADDRESS.into(),
            did: "did:ethr:besu:0x1111".into(),
            nickname: Some("멍멍".into()),
            email: None,
            profile_image: None,
            created_at: None,
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeAuth {
        pub fail_user: bool,
        pub fail_logout: bool,
        pub user_calls: AtomicUsize,
        pub last_vp: Mutex<Option<String>>,
    }

    fn unauthorized() -> GatewayError {
        GatewayError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: BackendErrorBody::default(),
        }
    }

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn current_user(&self, _wallet: &str) -> Result<User, GatewayError> {
            self.user_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_user {
                return Err(unauthorized());
            }
            Ok(user())
        }

        async fn login_with_vp(&self, _wallet: &str, vp: &str) -> Result<AuthResponse, GatewayError> {
            *self.last_vp.lock().unwrap() = Some(vp.to_string());
            Ok(AuthResponse {
                access_token: "access".into(),
                refresh_token: Some("refresh".into()),
                user: user(),
            })
        }

        async fn logout(&self) -> Result<(), GatewayError> {
            if self.fail_logout {
                return Err(unauthorized());
            }
            Ok(())
        }
    }

    fn seeded_store(wallet: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "access").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        store.set(WALLET_ADDRESS_KEY, wallet).unwrap();
        store
    }

    fn assert_cleared(store: &MemoryStore) {
        for key in CREDENTIAL_KEYS {
            assert_eq!(store.get(key).unwrap(), None, "{key} should be cleared");
        }
    }

    #[test]
    fn login_message_format() {
        assert_eq!(
            login_message(ADDRESS, 1_700_000_000_000),
            format!("Login to DogCatPaw\nAddress: {ADDRESS}\nTimestamp: 1700000000000")
        );
        assert_eq!(placeholder_vp_jwt("0xsig"), "placeholder_vp_jwt_0xsig");
    }

    #[tokio::test]
    async fn login_stores_credentials() {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(FakeAuth::default());
        let session = SessionManager::create(store.clone(), auth.clone());
        let wallet = CountingSigner::new();

        let logged_in = session.login(Some(&wallet)).await.unwrap();
        assert_eq!(logged_in, user());
        assert!(session.is_authenticated().await);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh"));
        assert_eq!(store.get(WALLET_ADDRESS_KEY).unwrap().as_deref(), Some(ADDRESS));
        assert!(auth
            .last_vp
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|vp| vp.starts_with("placeholder_vp_jwt_0x")));
    }

    #[tokio::test]
    async fn login_requires_wallet() {
        let session =
            SessionManager::create(Arc::new(MemoryStore::new()), Arc::new(FakeAuth::default()));
        assert!(matches!(
            session.login(None).await,
            Err(SessionError::WalletNotConnected)
        ));
    }

    #[tokio::test]
    async fn rehydrate_restores_matching_wallet() {
        let store = seeded_store(ADDRESS);
        let session = SessionManager::create(store.clone(), Arc::new(FakeAuth::default()));
        let wallet = CountingSigner::new();

        let state = session.rehydrate(Some(&wallet)).await.unwrap();
        assert_eq!(state, SessionState::Authenticated(user()));
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn rehydrate_with_mismatched_wallet_clears_everything() {
        let store = seeded_store("0x2222222222222222222222222222222222222222");
        let auth = Arc::new(FakeAuth::default());
        let session = SessionManager::create(store.clone(), auth.clone());
        let wallet = CountingSigner::new();

        let state = session.rehydrate(Some(&wallet)).await.unwrap();
        assert_eq!(state, SessionState::Unauthenticated);
        assert_cleared(&store);
        assert_eq!(auth.user_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rehydrate_without_connection_or_on_fetch_failure_clears() {
        let store = seeded_store(ADDRESS);
        let session = SessionManager::create(store.clone(), Arc::new(FakeAuth::default()));
        assert_eq!(
            session.rehydrate(None).await.unwrap(),
            SessionState::Unauthenticated
        );
        assert_cleared(&store);

        let store = seeded_store(ADDRESS);
        let auth = Arc::new(FakeAuth {
            fail_user: true,
            ..FakeAuth::default()
        });
        let session = SessionManager::create(store.clone(), auth);
        let wallet = CountingSigner::new();
        assert_eq!(
            session.rehydrate(Some(&wallet)).await.unwrap(),
            SessionState::Unauthenticated
        );
        assert_cleared(&store);
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(FakeAuth {
            fail_logout: true,
            ..FakeAuth::default()
        });
        let session = SessionManager::create(store.clone(), auth);
        let wallet = CountingSigner::new();
        session.login(Some(&wallet)).await.unwrap();

        session.logout().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_cleared(&store);
    }

    #[tokio::test]
    async fn wallet_disconnect_logs_out_only_when_authenticated() {
        let store = Arc::new(MemoryStore::new());
        store.set("unrelated", "kept").unwrap();
        let session = SessionManager::create(store.clone(), Arc::new(FakeAuth::default()));

        session.on_wallet_disconnected().await.unwrap();
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("kept"));

        let wallet = CountingSigner::new();
        session.login(Some(&wallet)).await.unwrap();
        session.on_wallet_disconnected().await.unwrap();
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert_cleared(&store);
    }

    #[tokio::test]
    async fn refresh_user_drops_user_on_failure() {
        let store = seeded_store(ADDRESS);
        let auth = Arc::new(FakeAuth {
            fail_user: true,
            ..FakeAuth::default()
        });
        let session = SessionManager::create(store.clone(), auth);

        assert_eq!(session.refresh_user().await.unwrap(), None);
        assert_eq!(session.user().await, None);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("access"));
    }
}
