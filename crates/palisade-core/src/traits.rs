//! Core traits for backing-store collaborators.

use crate::PalisadeResult;
use async_trait::async_trait;

/// Read-side contract for a keyed backing store.
///
/// The store is an external collaborator — a database, a remote service,
/// or an in-memory fixture in tests. Palisade only needs two query shapes:
/// a point lookup by key and a filtered range scan. A missing key is a
/// valid empty result (`Ok(None)`), not an error; the error channel is for
/// connectivity and query failures.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Key uniquely identifying one record.
    type Key: std::fmt::Display + Send + Sync;
    /// Record type returned by lookups.
    type Value: Send + Sync;
    /// Filter shape accepted by range queries.
    type Filter: Send + Sync;

    /// Finds a single record by its key.
    async fn find_by_key(&self, key: &Self::Key) -> PalisadeResult<Option<Self::Value>>;

    /// Finds all records matching a filter.
    async fn find_range(&self, filter: &Self::Filter) -> PalisadeResult<Vec<Self::Value>>;
}
