//! Per-key request coalescing for cold-cache fetches.

use palisade_core::PalisadeResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Coalesces concurrent fetches of the same key into one backing call.
///
/// The first caller for a key runs the fetch; callers arriving while it
/// is in flight wait for and share its result. Errors are not shared: if
/// the leader fails, the next waiter runs its own fetch, so a transient
/// failure is never latched.
pub struct FlightGroup {
    inflight: Mutex<HashMap<String, Arc<OnceCell<Option<String>>>>>,
}

impl FlightGroup {
    /// Creates an empty flight group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key`, deduplicating against concurrent callers.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> PalisadeResult<Option<String>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = PalisadeResult<Option<String>>>,
    {
        let cell = {
            let mut inflight = self.inflight.lock();
            inflight.entry(key.to_string()).or_default().clone()
        };

        let result = cell.get_or_try_init(work).await.map(Clone::clone);

        // Retire the flight so a later miss starts a fresh fetch. Another
        // caller may already have replaced the slot; leave theirs alone.
        let mut inflight = self.inflight.lock();
        if let Some(current) = inflight.get(key) {
            if Arc::ptr_eq(current, &cell) {
                inflight.remove(key);
            }
        }

        result
    }
}

impl Default for FlightGroup {
    fn default() -> Self {
        Self::new()
    }
}
