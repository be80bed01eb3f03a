//! LRU cache of per-hostname processors
//!
//! ## Locking
//!
//! One mutex guards the map. It is held for the lookup and for the
//! insert-if-absent check, never across the build future. Two requests
//! missing on the same hostname may therefore both build a processor; the
//! first to insert wins and the other caller drops its own instance and
//! returns the winner's.

use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::Result;
use crate::model::Hostname;
use crate::processor::Processor;

/// Bounded, least-recently-used map of hostname → processor
pub struct ProcessorCache<P = Processor> {
    entries: Mutex<LruCache<Hostname, Arc<P>>>,
}

impl<P> ProcessorCache<P> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached processor for `hostname`, building it on a miss
    ///
    /// `build` runs without the lock held. Its error is returned unchanged
    /// and nothing is cached.
    pub async fn get_or_create<F, Fut>(&self, hostname: &Hostname, build: F) -> Result<Arc<P>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        if let Some(processor) = self.lookup(hostname) {
            debug!(%hostname, "processor cache hit");
            return Ok(processor);
        }

        debug!(%hostname, "processor cache miss, building");
        let built = Arc::new(build().await?);
        Ok(self.insert_if_absent(hostname, built))
    }

    /// Cached processor for `hostname`, marking it most recently used
    pub fn lookup(&self, hostname: &Hostname) -> Option<Arc<P>> {
        self.lock().get(hostname).cloned()
    }

    fn insert_if_absent(&self, hostname: &Hostname, built: Arc<P>) -> Arc<P> {
        let mut entries = self.lock();

        if let Some(existing) = entries.get(hostname) {
            debug!(%hostname, "processor built concurrently, discarding ours");
            return Arc::clone(existing);
        }

        if let Some((evicted, _)) = entries.push(hostname.clone(), Arc::clone(&built)) {
            debug!(%evicted, "evicted least recently used processor");
        }
        built
    }

    /// Whether `hostname` is cached, without touching recency
    pub fn contains(&self, hostname: &Hostname) -> bool {
        self.lock().contains(hostname)
    }

    /// Cached hostnames, most recently used first
    pub fn hostnames(&self) -> Vec<Hostname> {
        self.lock().iter().map(|(hostname, _)| hostname.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<Hostname, Arc<P>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
