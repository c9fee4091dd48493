//! TTLKV Demo Binary
//!
//! Loads entries into a store, runs the background TTL cleaner against a
//! monotonic clock and reports evictions.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use ttlkv::{CleanerConfig, EntrySpec, KvStorage, MonotonicClock, TtlCleaner};

/// TTLKV - in-memory key-value store with per-entry expiration
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Entry to load, as key=value or key=value:ttl_seconds (0 = never expires)
    #[arg(short, long = "entry", value_name = "KEY=VALUE[:TTL]")]
    entries: Vec<EntrySpec>,

    /// Cleaner tick interval in milliseconds
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Maximum evictions per tick
    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// How long to run before printing the surviving entries
    #[arg(long, default_value_t = 5)]
    run_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ttlkv=info".parse()?))
        .init();

    let args = Args::parse();

    let config = CleanerConfig::default()
        .with_interval(Duration::from_millis(args.tick_ms))
        .with_batch_size(args.batch_size);

    let entries = args.entries.into_iter().map(EntrySpec::into_tuple);
    let store = KvStorage::new(entries, MonotonicClock::new()).into_shared();
    info!(entries = store.lock().len(), "Loaded store");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cleaner = TtlCleaner::new(store.clone(), config)
        .context("invalid cleaner settings")?
        .with_notifier(tx);
    let handle = cleaner.spawn();

    let deadline = tokio::time::sleep(Duration::from_secs(args.run_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some((key, value)) = rx.recv() => {
                info!(key = %key, value = %value, "Expired");
            }
        }
    }
    handle.abort();

    let store = store.lock();
    for (key, value) in store.get_many_sorted("", store.len()) {
        println!("{}\t{}", key, value);
    }
    info!("{}", store.metrics().summary());

    Ok(())
}
