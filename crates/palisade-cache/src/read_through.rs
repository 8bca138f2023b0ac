//! Cache-aside wrapper over a keyed backing store.

use crate::{keys, CacheStore, CacheStoreExt, FlightGroup, DEFAULT_TTL};
use palisade_core::{KeyedStore, PalisadeResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Cache-aside read path for one resource.
///
/// Point lookups check the cache first and fall back to the backing store
/// on miss, caching found records for the configured TTL. A "not found"
/// result is returned uncached, so records inserted later are visible on
/// the next lookup. Range queries pass through uncached — their results
/// are not point-addressable.
///
/// Concurrent lookups of a cold key may each hit the backing store
/// (last write wins); enable [`CacheAside::with_request_coalescing`] to
/// deduplicate them instead.
pub struct CacheAside<S> {
    resource: &'static str,
    store: Arc<S>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    flights: Option<FlightGroup>,
}

impl<S> CacheAside<S>
where
    S: KeyedStore,
    S::Value: Serialize + DeserializeOwned,
{
    /// Creates a cache-aside wrapper with the default TTL.
    pub fn new(resource: &'static str, store: Arc<S>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            resource,
            store,
            cache,
            ttl: DEFAULT_TTL,
            flights: None,
        }
    }

    /// Overrides the TTL applied to cached records.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Coalesces concurrent cold-key lookups into one backing-store call.
    #[must_use]
    pub fn with_request_coalescing(mut self) -> Self {
        self.flights = Some(FlightGroup::new());
        self
    }

    /// Looks up one record by key, serving from cache when possible.
    ///
    /// A backing-store error propagates to the caller and nothing is
    /// cached.
    pub async fn get(&self, key: &S::Key) -> PalisadeResult<Option<S::Value>> {
        let cache_key = keys::entry(self.resource, key);

        match &self.flights {
            None => {
                self.cache
                    .get_or_fetch(&cache_key, self.ttl, || self.store.find_by_key(key))
                    .await
            }
            Some(flights) => {
                if let Some(cached) = self.cache.get::<S::Value>(&cache_key).await? {
                    return Ok(Some(cached));
                }
                let raw = flights
                    .run(&cache_key, || self.fetch_raw(&cache_key, key))
                    .await?;
                match raw {
                    Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                    None => Ok(None),
                }
            }
        }
    }

    /// Runs a filtered range query against the backing store, uncached.
    pub async fn query(&self, filter: &S::Filter) -> PalisadeResult<Vec<S::Value>> {
        self.store.find_range(filter).await
    }

    /// Drops the cached record for one key, if present.
    pub async fn invalidate(&self, key: &S::Key) -> PalisadeResult<bool> {
        self.cache.delete(&keys::entry(self.resource, key)).await
    }

    /// Drops every cached record of this resource.
    pub async fn invalidate_all(&self) -> PalisadeResult<u64> {
        self.cache
            .delete_prefix(&keys::resource_prefix(self.resource))
            .await
    }

    /// Fetch path shared by coalesced lookups: the leader fetches,
    /// populates the cache, and hands the raw payload to its followers.
    async fn fetch_raw(&self, cache_key: &str, key: &S::Key) -> PalisadeResult<Option<String>> {
        match self.store.find_by_key(key).await? {
            Some(value) => {
                let json = serde_json::to_string(&value)?;
                if let Err(e) = self.cache.set_raw(cache_key, &json, self.ttl).await {
                    warn!("Failed to cache key '{}': {}", cache_key, e);
                }
                Ok(Some(json))
            }
            None => Ok(None),
        }
    }
}
