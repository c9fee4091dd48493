use std::time::Duration;

use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use ttlkv::{CleanerConfig, Clock, EntrySpec, Error, KvStorage, ManualClock, TtlCleaner};

fn load_sample(clock: &ManualClock) -> KvStorage<ManualClock> {
    let entries: Vec<EntrySpec> = ["a=k1:1", "b=k2:5", "c=k3:4", "d=k4:6", "e=k5:0"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    KvStorage::new(entries.into_iter().map(EntrySpec::into_tuple), clock.clone())
}

fn keys(items: &[(String, String)]) -> Vec<&str> {
    items.iter().map(|(k, _)| k.as_str()).collect()
}

#[test]
fn sample_scenario_over_time() {
    let clock = ManualClock::new(0);
    let store = load_sample(&clock);

    assert_eq!(store.get("a").as_deref(), Some("k1"));
    assert_eq!(keys(&store.get_many_sorted("a", 5)), ["a", "b", "c", "d", "e"]);
    assert_eq!(keys(&store.get_many_sorted("c", 2)), ["c", "d"]);

    clock.set(1);
    assert_eq!(store.get("a"), None);

    clock.set(4);
    assert_eq!(keys(&store.get_many_sorted("a", 5)), ["b", "d", "e"]);

    assert_ok!(store.check_invariants());
}

#[test]
fn ttl_boundary_is_exclusive() {
    let clock = ManualClock::new(100);
    let mut store = KvStorage::empty(clock.clone());

    for ttl in [1u32, 7, 1_000, u32::MAX] {
        clock.set(100);
        store.set("k", "v", ttl);
        let expires = 100 + u64::from(ttl);

        clock.set(expires - 1);
        assert_eq!(store.get("k").as_deref(), Some("v"));
        clock.set(expires);
        assert_eq!(store.get("k"), None);
        clock.set(expires + 1);
        assert_eq!(store.get("k"), None);
    }
    assert_eq!(store.expiration_slots(), 1);
}

#[test]
fn removed_key_stays_gone() {
    let clock = ManualClock::new(0);
    let mut store = load_sample(&clock);

    assert!(store.remove("e"));
    for t in [0, 10, u64::MAX] {
        clock.set(t);
        assert_eq!(store.get("e"), None);
    }
    assert!(!store.remove("e"));
    assert_eq!(store.len(), 4);
}

#[test]
fn eviction_drains_in_expiration_order() {
    let clock = ManualClock::new(0);
    let mut store = load_sample(&clock);

    let mut order = Vec::new();
    for t in 0..=10 {
        clock.set(t);
        while let Some((key, _)) = store.remove_one_expired_entry() {
            order.push((t, key));
        }
    }
    assert_eq!(
        order,
        vec![
            (1, "a".to_string()),
            (4, "c".to_string()),
            (5, "b".to_string()),
            (6, "d".to_string()),
        ]
    );
    assert_eq!(store.get("e").as_deref(), Some("k5"));
    assert_ok!(store.check_invariants());
}

#[test]
fn mixed_workload_keeps_indices_consistent() {
    let clock = ManualClock::new(0);
    let mut store = KvStorage::empty(clock.clone());

    for i in 0..500u32 {
        clock.advance(1);
        let key = format!("key-{:03}", i % 37);
        match i % 5 {
            0 => {
                store.remove(&key);
            }
            1 => {
                store.remove_one_expired_entry();
            }
            _ => store.set(key, format!("v{}", i), i % 11),
        }
        assert_ok!(store.check_invariants());
    }
    assert_eq!(store.len(), store.expiration_slots());
}

#[test]
fn works_with_trait_object_clock() {
    let clock = ManualClock::new(0);
    let boxed: Box<dyn Clock + Send> = Box::new(clock.clone());
    let mut store = KvStorage::new([("x", "1", 2)], boxed);

    clock.set(2);
    assert_eq!(store.remove_one_expired_entry(), Some(("x".into(), "1".into())));
}

#[test]
fn cleaner_rejects_zero_interval() {
    let store = KvStorage::empty(ManualClock::new(0)).into_shared();
    let config = CleanerConfig::default().with_interval(Duration::ZERO);
    let err = assert_err!(TtlCleaner::new(store, config).map(|_| ()));
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[tokio::test(start_paused = true)]
async fn cleaner_reclaims_unread_entries() {
    let clock = ManualClock::new(0);
    let store = load_sample(&clock).into_shared();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let config = CleanerConfig::default()
        .with_interval(Duration::from_secs(1))
        .with_batch_size(1);
    let handle = assert_ok!(TtlCleaner::new(store.clone(), config))
        .with_notifier(tx)
        .spawn();

    clock.set(6);
    let mut evicted = Vec::new();
    for _ in 0..4 {
        let (key, _) = rx.recv().await.unwrap();
        evicted.push(key);
    }
    handle.abort();

    assert_eq!(evicted, ["a", "c", "b", "d"]);
    let store = store.lock();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_many_sorted("", 10), vec![("e".to_string(), "k5".to_string())]);
}
