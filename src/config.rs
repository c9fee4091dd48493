//! Cleaner Configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Background TTL cleaner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    /// Time between cleanup passes
    pub interval: Duration,

    /// Maximum entries evicted per pass
    pub batch_size: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            batch_size: 128,
        }
    }
}

impl CleanerConfig {
    /// Set cleanup interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-pass eviction limit
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig("interval must be non-zero".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CleanerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = CleanerConfig::default().with_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = CleanerConfig::default().with_batch_size(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
