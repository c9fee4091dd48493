//! Storage Engine
//!
//! In-memory key-value store with TTL support.

mod clock;
mod entry;
mod store;
mod ttl;

pub use clock::{Clock, ManualClock, MonotonicClock, WallClock};
pub use entry::{EntrySpec, Expiry};
pub use store::{KvStorage, SharedStorage};
pub use ttl::TtlCleaner;
