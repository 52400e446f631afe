//! Cache Module
//!
//! In-process memoization of producer results with per-entry TTL expiration.

mod backend;
mod cached;
mod clock;
mod encode;
mod entry;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{producer, CacheBackend, FnProducer, Producer, UnsupportedBackend};
pub use cached::Cached;
pub use clock::{Clock, ManualClock, SystemClock};
pub use encode::EncodeError;
pub use entry::CacheEntry;
pub use key::{CacheKey, Kwargs};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::MemoryCache;
