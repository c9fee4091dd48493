//! TTL Key-Value Store
//!
//! Ordered key-value map paired with an expiration index. Both indices are
//! updated together by every mutation.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::clock::Clock;
use super::entry::Expiry;
use crate::error::{Error, Result};
use crate::metrics::Metrics;

/// Store shared between tasks; callers serialize access through the mutex
pub type SharedStorage<C> = Arc<Mutex<KvStorage<C>>>;

/// Value plus its back-reference into the expiration index
#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Expiry,
    seq: u64,
}

impl Slot {
    #[inline]
    fn expiration_key(&self) -> (Expiry, u64) {
        (self.expires_at, self.seq)
    }
}

/// In-memory key-value store with per-entry TTL.
///
/// Entries are kept in two indices:
/// - `values`: key → value, ordered by key for range scans
/// - `expirations`: (expiry, insertion seq) → key, ordered by expiry with
///   ties broken by insertion order
///
/// Each operation that depends on time reads the clock exactly once.
/// Expired entries stay in place until `remove`, `remove_one_expired_entry`
/// or `remove_expired` drops them; reads only hide them.
#[derive(Debug)]
pub struct KvStorage<C: Clock> {
    values: BTreeMap<String, Slot>,
    expirations: BTreeMap<(Expiry, u64), String>,
    next_seq: u64,
    clock: C,
    metrics: Metrics,
}

impl<C: Clock> KvStorage<C> {
    /// Bulk-load `(key, value, ttl)` entries.
    ///
    /// The clock is sampled once for the whole batch. A TTL of 0 never
    /// expires. When a key repeats, the last occurrence wins.
    pub fn new<I, K, V>(entries: I, clock: C) -> Self
    where
        I: IntoIterator<Item = (K, V, u32)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut storage = Self::empty(clock);
        let now = storage.clock.now();
        for (key, value, ttl) in entries {
            storage.insert_at(key.into(), value.into(), ttl, now);
        }
        trace!(entries = storage.len(), now, "Loaded store");
        storage
    }

    /// Create an empty store without reading the clock
    pub fn empty(clock: C) -> Self {
        Self {
            values: BTreeMap::new(),
            expirations: BTreeMap::new(),
            next_seq: 0,
            clock,
            metrics: Metrics::new(),
        }
    }

    /// Insert or replace `key`, expiring `ttl` ticks from now (0 = never)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, ttl: u32) {
        let now = self.clock.now();
        self.insert_at(key.into(), value.into(), ttl, now);
    }

    /// Delete `key` regardless of its expiration, returns true if it existed
    pub fn remove(&mut self, key: &str) -> bool {
        match self.values.remove(key) {
            Some(slot) => {
                self.expirations.remove(&slot.expiration_key());
                self.metrics.record_removal();
                trace!(key, "Removed key");
                true
            }
            None => false,
        }
    }

    /// Get value by key, returns None if key doesn't exist or is expired.
    ///
    /// An expired entry is not evicted by this call.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let value = self
            .values
            .get(key)
            .filter(|slot| !slot.expires_at.is_expired(now))
            .map(|slot| slot.value.clone());
        self.metrics.record_lookup(value.is_some());
        value
    }

    /// Up to `count` live entries in ascending key order, starting at the
    /// first key `>= start_key`. Expired entries are skipped, not removed.
    pub fn get_many_sorted(&self, start_key: &str, count: usize) -> Vec<(String, String)> {
        let now = self.clock.now();
        self.metrics.record_scan();
        self.values
            .range::<str, _>((Bound::Included(start_key), Bound::Unbounded))
            .filter(|(_, slot)| !slot.expires_at.is_expired(now))
            .take(count)
            .map(|(key, slot)| (key.clone(), slot.value.clone()))
            .collect()
    }

    /// Evict the earliest-expiring entry if it has expired.
    ///
    /// Only the head of the expiration order is examined: if it is still
    /// live, nothing after it can be expired.
    pub fn remove_one_expired_entry(&mut self) -> Option<(String, String)> {
        let now = self.clock.now();
        self.pop_expired(now)
    }

    /// Evict up to `limit` expired entries in expiration order, using a
    /// single clock sample
    pub fn remove_expired(&mut self, limit: usize) -> Vec<(String, String)> {
        let now = self.clock.now();
        let mut evicted = Vec::new();
        while evicted.len() < limit {
            match self.pop_expired(now) {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Earliest finite expiration currently stored
    pub fn next_expiration(&self) -> Option<u64> {
        self.expirations
            .first_key_value()
            .and_then(|((expiry, _), _)| expiry.as_ticks())
    }

    /// Number of stored entries, expired-but-present included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots in the expiration index
    pub fn expiration_slots(&self) -> usize {
        self.expirations.len()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Wrap the store for use from several tasks
    pub fn into_shared(self) -> SharedStorage<C> {
        Arc::new(Mutex::new(self))
    }

    /// Verify that the two indices describe the same set of entries
    pub fn check_invariants(&self) -> Result<()> {
        if self.values.len() != self.expirations.len() {
            return Err(Error::IndexCorrupted(format!(
                "{} values but {} expiration slots",
                self.values.len(),
                self.expirations.len()
            )));
        }
        for (key, slot) in &self.values {
            if slot.seq >= self.next_seq {
                return Err(Error::IndexCorrupted(format!(
                    "key {:?} has unissued sequence {}",
                    key, slot.seq
                )));
            }
            match self.expirations.get(&slot.expiration_key()) {
                Some(owner) if owner == key => {}
                Some(owner) => {
                    return Err(Error::IndexCorrupted(format!(
                        "slot ({}, {}) of {:?} is owned by {:?}",
                        slot.expires_at, slot.seq, key, owner
                    )))
                }
                None => {
                    return Err(Error::IndexCorrupted(format!(
                        "key {:?} has no expiration slot ({}, {})",
                        key, slot.expires_at, slot.seq
                    )))
                }
            }
        }
        Ok(())
    }

    fn insert_at(&mut self, key: String, value: String, ttl: u32, now: u64) {
        let expires_at = Expiry::from_ttl(now, ttl);
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.values.get_mut(&key) {
            Some(slot) => {
                self.expirations.remove(&slot.expiration_key());
                *slot = Slot {
                    value,
                    expires_at,
                    seq,
                };
                self.expirations.insert((expires_at, seq), key);
            }
            None => {
                self.expirations.insert((expires_at, seq), key.clone());
                self.values.insert(
                    key,
                    Slot {
                        value,
                        expires_at,
                        seq,
                    },
                );
            }
        }
        self.metrics.record_set();
    }

    fn pop_expired(&mut self, now: u64) -> Option<(String, String)> {
        let ((expiry, _), _) = self.expirations.first_key_value()?;
        if !expiry.is_expired(now) {
            return None;
        }
        let ((expiry, _), key) = self.expirations.pop_first()?;
        let slot = self.values.remove(&key);
        debug_assert!(slot.is_some(), "expiration slot for {:?} has no value", key);
        let slot = slot?;
        self.metrics.record_evictions(1);
        trace!(key = %key, expired_at = %expiry, now, "Evicted expired key");
        Some((key, slot.value))
    }
}
