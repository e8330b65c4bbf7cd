//! In-memory key store
//!
//! Keys are held in an immutable map behind a lock. Refreshing builds a new
//! map from scratch and swaps it in, so a lookup sees either the old key set
//! or the new one, never a mix of both. Readers clone the `Arc` and drop the
//! lock immediately; nothing is held across an await.

use crate::error::{Error, Result};
use crate::key::PublicKey;
use crate::resolver::KeyResolver;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type KeyMap = HashMap<String, Arc<PublicKey>>;

/// An entry that could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLoadError {
    pub kid: String,
    pub error: Error,
}

impl std::fmt::Display for KeyLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key {:?}: {}", self.kid, self.error)
    }
}

/// Key-id indexed public keys with atomic refresh
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<Arc<KeyMap>>,
}

impl KeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load keys from `(kid, DER bytes)` pairs
    ///
    /// Entries that fail to parse are skipped and returned alongside the
    /// store. A later entry with the same `kid` replaces an earlier one.
    pub fn from_der_entries<I, K, D>(entries: I) -> (Self, Vec<KeyLoadError>)
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: AsRef<[u8]>,
    {
        let (map, errors) = build_map(entries, |der: D| PublicKey::from_der(der.as_ref()));
        (Self::with_map(map), errors)
    }

    /// Load keys from `(kid, standard Base64 DER text)` pairs
    pub fn from_base64_entries<I, K, S>(entries: I) -> (Self, Vec<KeyLoadError>)
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        let (map, errors) = build_map(entries, |text: S| PublicKey::from_base64_der(text.as_ref()));
        (Self::with_map(map), errors)
    }

    /// Replace the whole key set with keys parsed from DER
    pub fn refresh_der<I, K, D>(&self, entries: I) -> Vec<KeyLoadError>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: AsRef<[u8]>,
    {
        let (map, errors) = build_map(entries, |der: D| PublicKey::from_der(der.as_ref()));
        self.swap(map);
        errors
    }

    /// Replace the whole key set with keys parsed from Base64 DER text
    pub fn refresh_base64<I, K, S>(&self, entries: I) -> Vec<KeyLoadError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        let (map, errors) = build_map(entries, |text: S| PublicKey::from_base64_der(text.as_ref()));
        self.swap(map);
        errors
    }

    /// Add or replace a single key
    pub fn insert(&self, kid: impl Into<String>, key: PublicKey) {
        let mut guard = self.keys.write();
        let mut map = KeyMap::clone(&guard);
        map.insert(kid.into(), Arc::new(key));
        *guard = Arc::new(map);
    }

    /// Remove a single key, returning it if it was present
    pub fn remove(&self, kid: &str) -> Option<Arc<PublicKey>> {
        let mut guard = self.keys.write();
        if !guard.contains_key(kid) {
            return None;
        }
        let mut map = KeyMap::clone(&guard);
        let removed = map.remove(kid);
        *guard = Arc::new(map);
        removed
    }

    pub fn get(&self, kid: &str) -> Option<Arc<PublicKey>> {
        self.snapshot().get(kid).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Identifiers of all loaded keys, sorted
    pub fn key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshot().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn with_map(map: KeyMap) -> Self {
        Self {
            keys: RwLock::new(Arc::new(map)),
        }
    }

    fn snapshot(&self) -> Arc<KeyMap> {
        Arc::clone(&*self.keys.read())
    }

    fn swap(&self, map: KeyMap) {
        let count = map.len();
        *self.keys.write() = Arc::new(map);
        tracing::debug!(keys = count, "key store refreshed");
    }
}

#[async_trait]
impl KeyResolver for KeyStore {
    async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
        Ok(self.get(kid))
    }
}

fn build_map<I, K, V, F>(entries: I, parse: F) -> (KeyMap, Vec<KeyLoadError>)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    F: Fn(V) -> Result<PublicKey>,
{
    let mut map = KeyMap::new();
    let mut errors = Vec::new();

    for (kid, value) in entries {
        let kid = kid.into();
        match parse(value) {
            Ok(key) => {
                map.insert(kid, Arc::new(key));
            }
            Err(error) => {
                tracing::warn!(kid = %kid, error = %error, "skipping key entry");
                errors.push(KeyLoadError { kid, error });
            }
        }
    }

    (map, errors)
}
