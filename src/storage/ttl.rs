//! TTL Cleaner
//!
//! Background task that periodically evicts expired keys from a shared store.

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::interval;
use tracing::{debug, info};

use super::clock::Clock;
use super::store::SharedStorage;
use crate::config::CleanerConfig;
use crate::error::Result;

/// Background TTL cleanup task
pub struct TtlCleaner<C: Clock> {
    store: SharedStorage<C>,
    config: CleanerConfig,
    notifier: Option<UnboundedSender<(String, String)>>,
}

impl<C> TtlCleaner<C>
where
    C: Clock + Send + 'static,
{
    /// Create a new TTL cleaner
    pub fn new(store: SharedStorage<C>, config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            notifier: None,
        })
    }

    /// Forward every evicted `(key, value)` to `tx`
    pub fn with_notifier(mut self, tx: UnboundedSender<(String, String)>) -> Self {
        self.notifier = Some(tx);
        self
    }

    /// Evict expired entries, earliest first, until none is left or the
    /// batch limit is reached
    pub fn run_once(&self) -> Vec<(String, String)> {
        let mut evicted = Vec::new();
        {
            let mut store = self.store.lock();
            while evicted.len() < self.config.batch_size {
                match store.remove_one_expired_entry() {
                    Some(entry) => evicted.push(entry),
                    None => break,
                }
            }
        }

        if let Some(tx) = &self.notifier {
            for entry in &evicted {
                // Receiver gone: nobody is listening, eviction still happened
                let _ = tx.send(entry.clone());
            }
        }
        evicted
    }

    /// Run the cleaner (should be spawned as a task)
    pub async fn run(self) {
        let mut ticker = interval(self.config.interval);
        info!(
            batch_size = self.config.batch_size,
            "TTL cleaner started, interval: {:?}", self.config.interval
        );

        loop {
            ticker.tick().await;
            let evicted = self.run_once();
            if !evicted.is_empty() {
                debug!(removed = evicted.len(), "Cleaned up expired keys");
            }
        }
    }

    /// Spawn the cleaner as a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
