//! # Palisade Cache
//!
//! Cache-aside read path for keyed lookups: a time-bounded in-memory
//! cache in front of a backing store, populated on miss, with optional
//! per-key request coalescing.

pub mod keys;
mod memory;
mod read_through;
mod single_flight;
mod store;

pub use memory::{MemoryCache, DEFAULT_SHARDS, DEFAULT_TTL};
pub use read_through::CacheAside;
pub use single_flight::FlightGroup;
pub use store::{CacheStore, CacheStoreExt};
