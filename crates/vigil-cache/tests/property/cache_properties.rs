use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use vigil_cache::{cache_key, QueryCache};
use vigil_core::clock::ManualClock;
use vigil_core::models::Filters;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Get(u8),
    Advance(u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..12).prop_map(Op::Get),
        (0u16..40).prop_map(Op::Advance),
    ]
}

proptest! {
    /// The cache never exceeds capacity, and any value it returns is the most
    /// recent value put under that key.
    #[test]
    fn bounded_and_never_stale(ops in prop::collection::vec(arb_op(), 1..200)) {
        let clock = Arc::new(ManualClock::new());
        let cache: QueryCache<u32> = QueryCache::new(5, Duration::from_secs(100), clock.clone());
        let mut latest: HashMap<u8, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    cache.put(k.to_string(), v);
                    latest.insert(k, v);
                }
                Op::Get(k) => {
                    if let Some(v) = cache.get(&k.to_string()) {
                        prop_assert_eq!(Some(&v), latest.get(&k));
                    }
                }
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs as u64)),
            }
            prop_assert!(cache.len() <= 5);
        }
    }

    /// hit_rate is always hits / (hits + misses).
    #[test]
    fn hit_rate_matches_counters(ops in prop::collection::vec(arb_op(), 1..200)) {
        let clock = Arc::new(ManualClock::new());
        let cache: QueryCache<u32> = QueryCache::new(4, Duration::from_secs(50), clock.clone());
        let mut lookups = 0u64;

        for op in ops {
            match op {
                Op::Put(k, v) => cache.put(k.to_string(), v),
                Op::Get(k) => {
                    cache.get(&k.to_string());
                    lookups += 1;
                }
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs as u64)),
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, lookups);
        if lookups == 0 {
            prop_assert_eq!(stats.hit_rate, 0.0);
        } else {
            let expected = stats.hits as f64 / lookups as f64;
            prop_assert!((stats.hit_rate - expected).abs() < 1e-12);
        }
    }

    /// Incidental formatting never changes the key.
    #[test]
    fn key_ignores_case_and_spacing(
        words in prop::collection::vec("[a-zA-Z0-9?]{1,8}", 1..8),
        pad in prop::collection::vec(1usize..4, 8),
    ) {
        let compact = words.join(" ");
        let spaced: String = words
            .iter()
            .zip(pad.iter().cycle())
            .map(|(w, n)| format!("{}{}", w.to_uppercase(), " ".repeat(*n)))
            .collect();
        let filters = Filters::new();
        prop_assert_eq!(cache_key(&compact, &filters), cache_key(&spaced, &filters));
    }
}

#[test]
fn inserting_capacity_plus_one_evicts_exactly_oldest() {
    let clock = Arc::new(ManualClock::new());
    let capacity = 50;
    let cache: QueryCache<usize> =
        QueryCache::new(capacity, Duration::from_secs(86_400), clock.clone());

    for i in 0..capacity {
        cache.put(format!("q{i}"), i);
        clock.advance(Duration::from_millis(10));
    }
    cache.put("overflow", capacity);

    assert_eq!(cache.len(), capacity);
    assert!(!cache.contains("q0"));
    for i in 1..capacity {
        assert!(cache.contains(&format!("q{i}")), "q{i} should survive");
    }
}

#[test]
fn concurrent_access_keeps_counters_consistent() {
    let clock = Arc::new(ManualClock::new());
    let cache: Arc<QueryCache<usize>> =
        Arc::new(QueryCache::new(64, Duration::from_secs(3600), clock));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("k{}", (i * 7 + t) % 100);
                    if cache.get(&key).is_none() {
                        cache.put(key, i);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8 * 500);
    assert!(stats.size <= 64);
}
