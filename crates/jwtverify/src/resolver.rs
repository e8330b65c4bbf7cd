//! Key resolution capability
//!
//! The token verifier never owns key material directly. It asks a
//! [`KeyResolver`] for the key named by the token's `kid` and treats
//! `Ok(None)` as "no such key". Resolvers may be local maps, the
//! refreshable [`KeyStore`](crate::KeyStore), a
//! [`CachingResolver`](crate::CachingResolver) in front of something slower,
//! or any caller-provided backend.

use crate::error::Result;
use crate::key::PublicKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolve a key identifier to a public key
///
/// # Returns
///
/// - `Ok(Some(key))` if the identifier is known
/// - `Ok(None)` if it is not
/// - `Err(_)` if the backend could not answer; the verifier reports this as
///   a resolver failure, never as an unknown key
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>>;
}

#[async_trait]
impl KeyResolver for HashMap<String, Arc<PublicKey>> {
    async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
        Ok(self.get(kid).cloned())
    }
}

#[async_trait]
impl<R: KeyResolver + ?Sized> KeyResolver for Arc<R> {
    async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
        (**self).resolve(kid).await
    }
}
