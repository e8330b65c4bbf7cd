//! Caching key resolver
//!
//! Wraps a slower [`KeyResolver`] with a bounded, time-limited cache. Only
//! successful lookups are stored: unknown identifiers and resolver errors
//! always go back to the inner resolver.

use crate::error::Result;
use crate::key::PublicKey;
use crate::limits::MAX_KID_LENGTH;
use crate::resolver::KeyResolver;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Default number of cached keys
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default lifetime of a cached key (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Resolver decorator caching resolved keys by `kid`
#[derive(Clone)]
pub struct CachingResolver<R> {
    inner: R,
    cache: Cache<String, Arc<PublicKey>>,
}

impl<R: KeyResolver> CachingResolver<R> {
    /// Wrap `inner` with a cache of at most `capacity` keys, each kept for `ttl`
    pub fn new(inner: R, capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Drop a single cached key
    pub async fn invalidate(&self, kid: &str) {
        self.cache.invalidate(kid).await;
    }

    /// Drop every cached key
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: KeyResolver> std::fmt::Debug for CachingResolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingResolver")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: KeyResolver> KeyResolver for CachingResolver<R> {
    async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
        if kid.len() > MAX_KID_LENGTH {
            return self.inner.resolve(kid).await;
        }

        if let Some(key) = self.cache.get(kid).await {
            tracing::debug!(kid, "key cache hit");
            return Ok(Some(key));
        }
        tracing::debug!(kid, "key cache miss");

        let resolved = self.inner.resolve(kid).await?;
        if let Some(key) = &resolved {
            self.cache.insert(kid.to_string(), Arc::clone(key)).await;
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EC_P256_SPKI: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEqXoxBtDDCABMDSDBCTepj302rxLbM0VfgyHY+Kw5Fvm2cbQuxSZDoeM733P1IIwin0T3WLsmxlES8JIj27knJg==";

    struct CountingResolver {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingResolver {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyResolver for CountingResolver {
        async fn resolve(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::ResolverFailure("backend down".into()));
            }
            if kid == "known" {
                Ok(Some(Arc::new(PublicKey::from_base64_der(EC_P256_SPKI)?)))
            } else {
                Ok(None)
            }
        }
    }

    fn caching(fail: bool) -> CachingResolver<Arc<CountingResolver>> {
        CachingResolver::new(
            Arc::new(CountingResolver::new(fail)),
            DEFAULT_CACHE_CAPACITY,
            DEFAULT_CACHE_TTL,
        )
    }

    #[tokio::test]
    async fn test_hits_are_cached() {
        let resolver = caching(false);
        for _ in 0..3 {
            assert!(resolver.resolve("known").await.unwrap().is_some());
        }
        assert_eq!(resolver.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let resolver = caching(false);
        for _ in 0..3 {
            assert!(resolver.resolve("unknown").await.unwrap().is_none());
        }
        assert_eq!(resolver.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let resolver = caching(true);
        assert!(resolver.resolve("known").await.is_err());
        assert!(resolver.resolve("known").await.is_err());
        assert_eq!(resolver.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let resolver = caching(false);
        resolver.resolve("known").await.unwrap();
        resolver.invalidate("known").await;
        resolver.resolve("known").await.unwrap();
        assert_eq!(resolver.inner().calls(), 2);

        resolver.invalidate_all();
        resolver.resolve("known").await.unwrap();
        assert_eq!(resolver.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_overlong_kid_bypasses_cache() {
        let resolver = caching(false);
        let kid = "k".repeat(MAX_KID_LENGTH + 1);
        resolver.resolve(&kid).await.unwrap();
        resolver.resolve(&kid).await.unwrap();
        assert_eq!(resolver.inner().calls(), 2);
    }
}
