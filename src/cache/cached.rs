//! Cached Producer Module
//!
//! Wraps a producer so every call goes through a cache backend.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheBackend, Kwargs, Producer};

// == Cached ==
/// A producer bound to a backend and a TTL.
///
/// Calling it looks like calling the producer, except results are served
/// from the backend while they are fresh.
#[derive(Debug)]
pub struct Cached<P, B> {
    producer: P,
    ttl: Duration,
    backend: Arc<B>,
}

impl<P, B> Cached<P, B>
where
    P: Producer,
    B: CacheBackend,
{
    pub fn new(producer: P, ttl: Duration, backend: Arc<B>) -> Self {
        Self {
            producer,
            ttl,
            backend,
        }
    }

    /// Returns the cached result for `args`, producing it on a miss.
    pub fn call(&self, args: &P::Args) -> Result<Arc<P::Output>, P::Error> {
        self.call_with(args, &Kwargs::new())
    }

    /// Like [`call`](Self::call), with keyword arguments.
    pub fn call_with(&self, args: &P::Args, kwargs: &Kwargs) -> Result<Arc<P::Output>, P::Error> {
        self.backend.get_or_set(&self.producer, self.ttl, args, kwargs)
    }

    /// Re-runs the producer and replaces the cached result.
    pub fn refresh(&self, args: &P::Args) -> Result<Arc<P::Output>, P::Error> {
        self.backend
            .set_expire(&self.producer, self.ttl, args, &Kwargs::new())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl<P: Clone, B> Clone for Cached<P, B> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
            ttl: self.ttl,
            backend: Arc::clone(&self.backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{producer, ManualClock, MemoryCache};
    use crate::error::CacheError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cached_call_memoizes() {
        let cache = Arc::new(MemoryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = producer("load", move |_: &(), _: &Kwargs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(vec!["row".to_string()])
        });
        let cached = Cached::new(loader, Duration::from_secs(60), Arc::clone(&cache));

        let first = cached.call(&()).unwrap();
        let second = cached.call(&()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.ttl(), Duration::from_secs(60));
        assert_eq!(cached.producer().name(), "load");
    }

    #[test]
    fn test_cached_call_reloads_after_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = producer("load", move |_: &(), _: &Kwargs| {
            Ok::<_, CacheError>(counter.fetch_add(1, Ordering::SeqCst))
        });
        let cached = Cached::new(loader, Duration::from_secs(60), cache);

        assert_eq!(*cached.call(&()).unwrap(), 0);
        clock.advance(Duration::from_secs(59));
        assert_eq!(*cached.call(&()).unwrap(), 0);
        clock.advance(Duration::from_secs(1));
        assert_eq!(*cached.call(&()).unwrap(), 1);
    }

    #[test]
    fn test_refresh_replaces_result() {
        let cache = Arc::new(MemoryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = producer("load", move |_: &(), _: &Kwargs| {
            Ok::<_, CacheError>(counter.fetch_add(1, Ordering::SeqCst))
        });
        let cached = Cached::new(loader, Duration::from_secs(60), Arc::clone(&cache));

        assert_eq!(*cached.call(&()).unwrap(), 0);
        assert_eq!(*cached.refresh(&()).unwrap(), 1);
        assert_eq!(*cached.call(&()).unwrap(), 1);
        assert_eq!(cached.backend().len(), 1);
    }
}
