//! Memory Cache Module
//!
//! Process-local cache backend: a HashMap of entries with lazy TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::{
    CacheBackend, CacheEntry, CacheKey, CacheStats, CacheStatsSnapshot, Clock, Kwargs, Producer,
    SystemClock,
};
use crate::error::CacheError;

// == Memory Cache ==
/// In-memory cache backend, safe to share between threads.
///
/// Populations are serialized by a single mutex that is held while the
/// producer runs. Lookups only take the map's read lock briefly and are not
/// held up by a running producer.
pub struct MemoryCache {
    /// Stored entries, expired ones included until overwritten
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    /// Serializes producer runs and their writes
    populate: Mutex<()>,
    /// Time source for expiration
    clock: Arc<dyn Clock>,
    /// Activity counters
    stats: CacheStats,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            populate: Mutex::new(()),
            clock,
            stats: CacheStats::new(),
        }
    }

    // == Clean ==
    /// Discards every entry and zeroes the counters.
    ///
    /// Waits for a running population, so nothing it stores survives the clean.
    pub fn clean(&self) {
        let _populating = self.populate.lock();
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        self.stats.reset();
        debug!(removed, "Cache cleaned");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl CacheBackend for MemoryCache {
    // == Get ==
    /// Returns the stored result if present and not yet expired.
    ///
    /// Expired entries stay in the map; they are only reported as misses.
    fn get<P: Producer>(
        &self,
        producer: &P,
        args: &P::Args,
        kwargs: &Kwargs,
    ) -> Result<Option<Arc<P::Output>>, CacheError> {
        let key = CacheKey::derive(producer.name(), args, kwargs)?;
        let now = self.clock.now_ms();

        let hit = self
            .entries
            .read()
            .get(&key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(CacheEntry::result::<P::Output>);

        match hit {
            Some(result) => {
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                Ok(Some(result))
            }
            None => {
                self.stats.record_miss();
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    // == Set Expire ==
    /// Runs the producer and stores its result until `now + ttl`.
    ///
    /// The expiration is measured from when the producer returns.
    fn set_expire<P: Producer>(
        &self,
        producer: &P,
        ttl: Duration,
        args: &P::Args,
        kwargs: &Kwargs,
    ) -> Result<Arc<P::Output>, P::Error> {
        let key = CacheKey::derive(producer.name(), args, kwargs)?;

        let _populating = self.populate.lock();
        let result = Arc::new(producer.produce(args, kwargs)?);

        let entry = CacheEntry::new(Arc::clone(&result), self.clock.now_ms(), ttl);
        debug!(key = %key, expires_at = entry.expires_at, "Cache populated");
        self.entries.write().insert(key, entry);
        self.stats.record_population();

        Ok(result)
    }
}
