//! In-memory cache implementation.

use crate::CacheStore;
use palisade_core::PalisadeResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default TTL for cached items (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Default number of shards in the striped map.
pub const DEFAULT_SHARDS: usize = 16;

/// A single cached value with its expiry.
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type Shard = RwLock<HashMap<String, CacheEntry>>;

/// In-memory cache striped across independently locked shards, so writes
/// to unrelated keys do not contend on one lock.
///
/// Expired entries are treated as absent and removed lazily when a read
/// encounters them; there is no background sweeper.
pub struct MemoryCache {
    shards: Option<Vec<Shard>>,
}

impl MemoryCache {
    /// Create a cache with the default shard count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a cache with a custom shard count.
    #[must_use]
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: Some((0..shards).map(|_| RwLock::new(HashMap::new())).collect()),
        }
    }

    /// Create a no-op cache (for when caching is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { shards: None }
    }

    fn shard(&self, key: &str) -> Option<&Shard> {
        let shards = self.shards.as_ref()?;
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Some(&shards[(hasher.finish() as usize) % shards.len()])
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn is_enabled(&self) -> bool {
        self.shards.is_some()
    }

    async fn get_raw(&self, key: &str) -> PalisadeResult<Option<String>> {
        let Some(shard) = self.shard(key) else {
            return Ok(None);
        };

        let now = Instant::now();
        {
            let entries = shard.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!("Cache hit for key '{}'", key);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {} // expired, fall through to remove under the write lock
                None => {
                    debug!("Cache miss for key '{}'", key);
                    return Ok(None);
                }
            }
        }

        let mut entries = shard.write();
        if let Some(entry) = entries.get(key) {
            // Another writer may have refreshed the entry in the gap.
            if entry.is_expired(now) {
                entries.remove(key);
            } else {
                debug!("Cache hit for key '{}'", key);
                return Ok(Some(entry.value.clone()));
            }
        }

        debug!("Cache miss for key '{}' (expired)", key);
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> PalisadeResult<()> {
        let Some(shard) = self.shard(key) else {
            return Ok(());
        };

        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        shard.write().insert(key.to_string(), entry);

        debug!("Cached key '{}' with TTL {:?}", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> PalisadeResult<bool> {
        let Some(shard) = self.shard(key) else {
            return Ok(false);
        };

        let deleted = shard.write().remove(key).is_some();
        debug!("Deleted key '{}': {}", key, deleted);
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> PalisadeResult<bool> {
        Ok(self.get_raw(key).await?.is_some())
    }

    async fn delete_prefix(&self, prefix: &str) -> PalisadeResult<u64> {
        let Some(shards) = self.shards.as_ref() else {
            return Ok(0);
        };

        let mut deleted = 0u64;
        for shard in shards {
            let mut entries = shard.write();
            let before = entries.len();
            entries.retain(|key, _| !key.starts_with(prefix));
            deleted += (before - entries.len()) as u64;
        }

        debug!("Deleted {} keys with prefix '{}'", deleted, prefix);
        Ok(deleted)
    }
}
