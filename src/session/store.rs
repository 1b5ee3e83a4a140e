// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Credential storage.
//!
//! Two scopes exist: durable storage for `accessToken`, `refreshToken` and
//! `walletAddress`, and a short-lived scope for the `verifiedEmail` marker.
//! Both sit behind [`KeyValueStore`] so the session manager, the Bearer
//! client and tests can share or swap them.

use std::{
    collections::HashMap,
    fs,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use thiserror::Error;
use tracing::debug;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";
pub const VERIFIED_EMAIL_KEY: &str = "verifiedEmail";

/// Keys cleared whenever a session is invalidated.
pub const CREDENTIAL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, WALLET_ADDRESS_KEY];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;

    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        keys.iter().try_for_each(|key| self.remove(key))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-lifetime storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Durable storage: a single JSON object on disk, rewritten on every change.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened credential store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// The email that passed verification, waiting for the registration step.
#[derive(Clone)]
pub struct VerifiedEmailMarker {
    store: Arc<dyn KeyValueStore>,
}

impl VerifiedEmailMarker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn record(&self, email: &str) -> StoreResult<()> {
        self.store.set(VERIFIED_EMAIL_KEY, email.trim())
    }

    /// The marker if present and non-empty. Gates entry to registration.
    pub fn peek(&self) -> StoreResult<Option<String>> {
        Ok(self
            .store
            .get(VERIFIED_EMAIL_KEY)?
            .filter(|email| !email.trim().is_empty()))
    }

    /// Read and delete the marker as registration begins.
    pub fn consume(&self) -> StoreResult<Option<String>> {
        let email = self.peek()?;
        self.store.remove(VERIFIED_EMAIL_KEY)?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip_and_bulk_remove() {
        let store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "a").unwrap();
        store.set(WALLET_ADDRESS_KEY, "0xabc").unwrap();
        store.set("other", "kept").unwrap();

        store.remove_all(&CREDENTIAL_KEYS).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(WALLET_ADDRESS_KEY).unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set(ACCESS_TOKEN_KEY, "token").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        store.remove(REFRESH_TOKEN_KEY).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("token"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn verified_email_is_consumed_once() {
        let marker = VerifiedEmailMarker::new(Arc::new(MemoryStore::new()));
        assert_eq!(marker.peek().unwrap(), None);

        marker.record("  user@example.com ").unwrap();
        assert_eq!(marker.peek().unwrap().as_deref(), Some("user@example.com"));
        assert_eq!(marker.consume().unwrap().as_deref(), Some("user@example.com"));
        assert_eq!(marker.consume().unwrap(), None);
    }

    #[test]
    fn blank_marker_does_not_count() {
        let store = Arc::new(MemoryStore::new());
        store.set(VERIFIED_EMAIL_KEY, "   ").unwrap();
        let marker = VerifiedEmailMarker::new(store);
        assert_eq!(marker.peek().unwrap(), None);
    }
}
