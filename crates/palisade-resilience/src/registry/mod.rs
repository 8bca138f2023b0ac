//! Per-resource circuit breaker registry.

use crate::{CircuitBreaker, CircuitBreakerConfig};
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const REGISTRY_SHARDS: usize = 16;

/// Shared circuit breakers keyed by resource, striped so breakers for
/// unrelated resources never contend on one lock.
///
/// The key type is caller-defined — typically an enum naming the
/// process's downstream resources, so breaker lookup is typed rather
/// than stringly. Breaker state is per-process; there is no
/// cross-instance coordination.
pub struct BreakerRegistry<K> {
    config: CircuitBreakerConfig,
    shards: Vec<RwLock<HashMap<K, Arc<CircuitBreaker>>>>,
}

impl<K> BreakerRegistry<K>
where
    K: Eq + Hash + Clone + Display,
{
    /// Creates a registry whose breakers share one configuration.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            shards: (0..REGISTRY_SHARDS).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    /// Returns the breaker for a resource, creating it on first use.
    pub fn breaker(&self, key: &K) -> Arc<CircuitBreaker> {
        let shard = self.shard(key);

        if let Some(breaker) = shard.read().get(key) {
            return breaker.clone();
        }

        let mut entries = shard.write();
        entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(key.to_string(), self.config.clone())))
            .clone()
    }

    /// Returns the number of registered breakers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    /// Returns `true` if no breaker has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard(&self, key: &K) -> &RwLock<HashMap<K, Arc<CircuitBreaker>>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }
}

impl<K> Default for BreakerRegistry<K>
where
    K: Eq + Hash + Clone + Display,
{
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
