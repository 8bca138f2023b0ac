//! Cache store trait for abstracted caching operations.

use palisade_core::PalisadeResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Cache store for keyed, time-bounded values.
///
/// Uses JSON strings for type-erased storage to maintain dyn-compatibility;
/// the typed convenience layer lives in [`CacheStoreExt`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> PalisadeResult<Option<String>>;

    /// Set a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> PalisadeResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> PalisadeResult<bool>;

    /// Check if a non-expired entry exists for the key.
    async fn exists(&self, key: &str) -> PalisadeResult<bool>;

    /// Delete all keys starting with the given prefix.
    ///
    /// Returns the number of keys deleted.
    async fn delete_prefix(&self, prefix: &str) -> PalisadeResult<u64>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Get a typed value from the cache.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> PalisadeResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> PalisadeResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }

    /// Cache-aside lookup: get a value, or fetch and cache it on miss.
    ///
    /// A fetch yielding `None` is returned as-is and never cached, so a
    /// record inserted later is visible on the next lookup. A fetch error
    /// propagates with nothing written. A cache-write failure is logged
    /// and swallowed — the fetched value is still valid.
    async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> PalisadeResult<Option<T>>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = PalisadeResult<Option<T>>> + Send,
    {
        if let Some(cached) = self.get::<T>(key).await? {
            return Ok(Some(cached));
        }

        match fetch().await? {
            Some(value) => {
                if let Err(e) = self.set(key, &value, ttl).await {
                    warn!("Failed to cache key '{}': {}", key, e);
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

// Blanket implementation for all CacheStore implementations
impl<T: CacheStore + ?Sized> CacheStoreExt for T {}
