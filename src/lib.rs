//! TTLKV - In-Process Key-Value Store with Expiration
//!
//! Ordered key-value storage where every entry carries an optional
//! time-to-live, driven by an injected clock.

pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;

pub use config::CleanerConfig;
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use storage::{
    Clock, EntrySpec, Expiry, KvStorage, ManualClock, MonotonicClock, SharedStorage, TtlCleaner,
    WallClock,
};
