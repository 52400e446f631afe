//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and expiration over generated calls.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{producer, CacheBackend, CacheKey, Kwargs, ManualClock, MemoryCache};
use crate::error::CacheError;

// == Test Configuration ==
const START_MS: u64 = 1_700_000_000_000;

// == Strategies ==
/// Generates short argument strings
fn arg_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ]{0,16}"
}

/// Generates distinct keyword argument names with integer values
fn kwargs_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

fn build_kwargs(pairs: &[(String, i64)]) -> Kwargs {
    let mut kwargs = Kwargs::new();
    for (name, value) in pairs {
        kwargs.insert(name.clone(), value).unwrap();
    }
    kwargs
}

fn concat_cache() -> (Arc<ManualClock>, MemoryCache) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (clock.clone(), MemoryCache::with_clock(clock))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Repeated lookups of one call return the stored result itself.
    #[test]
    fn prop_key_determinism(a in arg_strategy(), b in arg_strategy()) {
        let (_, cache) = concat_cache();
        let concat = producer("concat", |(a, b): &(String, String), _: &Kwargs| {
            Ok::<_, CacheError>(format!("{a}{b}"))
        });
        let args = (a.clone(), b.clone());

        let stored = cache.set_expire(&concat, Duration::from_secs(60), &args, &Kwargs::new()).unwrap();
        let first = cache.get(&concat, &(a.clone(), b.clone()), &Kwargs::new()).unwrap().unwrap();
        let second = cache.get(&concat, &(a, b), &Kwargs::new()).unwrap().unwrap();

        prop_assert!(Arc::ptr_eq(&stored, &first));
        prop_assert!(Arc::ptr_eq(&first, &second));
    }

    // Calls with different arguments never share an entry.
    #[test]
    fn prop_argument_sensitivity(
        a in arg_strategy(),
        b in arg_strategy(),
        c in arg_strategy(),
        d in arg_strategy(),
    ) {
        prop_assume!((a.as_str(), b.as_str()) != (c.as_str(), d.as_str()));

        let (_, cache) = concat_cache();
        let concat = producer("concat", |(a, b): &(String, String), _: &Kwargs| {
            Ok::<_, CacheError>(format!("{a}{b}"))
        });

        cache.get_or_set(&concat, Duration::from_secs(600), &(a, b), &Kwargs::new()).unwrap();
        prop_assert!(cache.get(&concat, &(c, d), &Kwargs::new()).unwrap().is_none());
    }

    // Keyword argument insertion order never changes the key.
    #[test]
    fn prop_kwargs_order_independent(pairs in kwargs_strategy()) {
        let forward = build_kwargs(&pairs);
        let mut reversed_pairs = pairs.clone();
        reversed_pairs.reverse();
        let reversed = build_kwargs(&reversed_pairs);

        prop_assert_eq!(
            CacheKey::derive("f", &(), &forward).unwrap(),
            CacheKey::derive("f", &(), &reversed).unwrap()
        );
    }

    // Entries are served strictly before their TTL elapses and never after.
    #[test]
    fn prop_expiration(ttl_secs in 1u64..3_600, elapsed_ms in 0u64..7_200_000) {
        let (clock, cache) = concat_cache();
        let p = producer("value", |x: &u32, _: &Kwargs| Ok::<_, CacheError>(*x));

        cache.set_expire(&p, Duration::from_secs(ttl_secs), &9, &Kwargs::new()).unwrap();
        clock.advance(Duration::from_millis(elapsed_ms));

        let hit = cache.get(&p, &9, &Kwargs::new()).unwrap();
        prop_assert_eq!(hit.is_some(), elapsed_ms < ttl_secs * 1_000);
    }

    // Repeated get_or_set on fresh keys runs the producer once per key.
    #[test]
    fn prop_one_population_per_fresh_key(keys in prop::collection::vec(0u8..16, 1..64)) {
        let (_, cache) = concat_cache();
        let calls = AtomicUsize::new(0);
        let p = producer("count", |x: &u8, _: &Kwargs| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(u32::from(*x) * 2)
        });

        for key in &keys {
            let value = cache.get_or_set(&p, Duration::from_secs(60), key, &Kwargs::new()).unwrap();
            prop_assert_eq!(*value, u32::from(*key) * 2);
        }

        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(calls.load(Ordering::SeqCst), distinct.len());
        prop_assert_eq!(cache.len(), distinct.len());
    }

    // After clean, nothing that was stored can be found.
    #[test]
    fn prop_clean_resets_all(keys in prop::collection::vec(arg_strategy(), 1..32)) {
        let (_, cache) = concat_cache();
        let p = producer("len", |s: &String, _: &Kwargs| Ok::<_, CacheError>(s.len()));

        for key in &keys {
            cache.set_expire(&p, Duration::from_secs(60), key, &Kwargs::new()).unwrap();
        }
        cache.clean();

        prop_assert!(cache.is_empty());
        for key in &keys {
            prop_assert!(cache.get(&p, key, &Kwargs::new()).unwrap().is_none());
        }
    }
}
