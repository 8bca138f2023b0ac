//! Cache key builders for consistent key naming.

use std::fmt::Display;

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "palisade:cache";

/// Generate a cache key for a single record of a resource.
#[must_use]
pub fn entry(resource: &str, key: impl Display) -> String {
    format!("{}:{}:{}", CACHE_PREFIX, resource, key)
}

/// Prefix covering every cache entry of a resource, for bulk invalidation.
#[must_use]
pub fn resource_prefix(resource: &str) -> String {
    format!("{}:{}:", CACHE_PREFIX, resource)
}
