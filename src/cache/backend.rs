//! Cache Backend Module
//!
//! Defines the producer contract and the backend contract every cache
//! store implements.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::Kwargs;
use crate::error::CacheError;

// == Producer ==
/// A function whose result can be memoized.
///
/// `name` is the producer's identity in the cache key, so two producers
/// sharing a backend must not share a name.
pub trait Producer {
    /// Positional arguments, encoded into the cache key
    type Args: Serialize;
    /// Produced value, shared immutably once cached
    type Output: Send + Sync + 'static;
    /// Failure type; cache errors convert into it so they can share a channel
    type Error: From<CacheError>;

    /// Stable identifier of this producer.
    fn name(&self) -> &str;

    /// Computes the value for the given arguments.
    fn produce(&self, args: &Self::Args, kwargs: &Kwargs) -> Result<Self::Output, Self::Error>;
}

// == Closure Producer ==
/// Adapts a named closure into a [`Producer`].
pub struct FnProducer<A, T, E, F> {
    name: &'static str,
    func: F,
    _marker: PhantomData<fn(&A) -> Result<T, E>>,
}

/// Creates a producer from a closure.
///
/// ```ignore
/// let concat = producer("concat", |(a, b): &(String, String), _: &Kwargs| {
///     Ok::<_, CacheError>(format!("{a}{b}"))
/// });
/// ```
pub fn producer<A, T, E, F>(name: &'static str, func: F) -> FnProducer<A, T, E, F>
where
    F: Fn(&A, &Kwargs) -> Result<T, E>,
{
    FnProducer {
        name,
        func,
        _marker: PhantomData,
    }
}

impl<A, T, E, F> Producer for FnProducer<A, T, E, F>
where
    A: Serialize,
    T: Send + Sync + 'static,
    E: From<CacheError>,
    F: Fn(&A, &Kwargs) -> Result<T, E>,
{
    type Args = A;
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        self.name
    }

    fn produce(&self, args: &A, kwargs: &Kwargs) -> Result<T, E> {
        (self.func)(args, kwargs)
    }
}

impl<A, T, E, F> fmt::Debug for FnProducer<A, T, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProducer").field("name", &self.name).finish()
    }
}

// == Cache Backend ==
/// Storage contract for memoized producer results.
///
/// Backends must override [`get`](CacheBackend::get) and
/// [`set_expire`](CacheBackend::set_expire); the provided bodies fail with
/// [`CacheError::NotImplemented`].
pub trait CacheBackend: Send + Sync {
    /// Returns the stored result for this call if present and not expired.
    ///
    /// A miss is `Ok(None)`, never an error.
    fn get<P: Producer>(
        &self,
        producer: &P,
        args: &P::Args,
        kwargs: &Kwargs,
    ) -> Result<Option<Arc<P::Output>>, CacheError> {
        let _ = (producer, args, kwargs);
        Err(CacheError::NotImplemented("get"))
    }

    /// Runs the producer unconditionally and stores its result for `ttl`.
    ///
    /// Producer errors are returned unchanged and leave no entry behind.
    fn set_expire<P: Producer>(
        &self,
        producer: &P,
        ttl: Duration,
        args: &P::Args,
        kwargs: &Kwargs,
    ) -> Result<Arc<P::Output>, P::Error> {
        let _ = (producer, ttl, args, kwargs);
        Err(CacheError::NotImplemented("set_expire").into())
    }

    /// Returns the cached result, populating the entry on a miss.
    ///
    /// The lookup and the population are separate steps: concurrent callers
    /// that miss on the same key each run the producer.
    fn get_or_set<P: Producer>(
        &self,
        producer: &P,
        ttl: Duration,
        args: &P::Args,
        kwargs: &Kwargs,
    ) -> Result<Arc<P::Output>, P::Error> {
        match self.get(producer, args, kwargs)? {
            Some(hit) => Ok(hit),
            None => self.set_expire(producer, ttl, args, kwargs),
        }
    }
}

// == Unsupported Backend ==
/// Backend that implements nothing; every operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

impl CacheBackend for UnsupportedBackend {}
