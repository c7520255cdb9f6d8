use crate::config::PollConfig;

/// Timing constants for the poll scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub base_interval_ms: u64,
    pub background_interval_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_multiplier: f64,
    pub backoff_ceiling_ms: u64,
    /// Failures later than this since the last success surface a diagnostic.
    pub stale_threshold_ms: u64,
    /// Failures later than this since the last success flip to offline.
    pub offline_threshold_ms: u64,
    pub diagnostic_ttl_ms: u64,
}

impl PollPolicy {
    pub fn from_config(config: &PollConfig) -> Self {
        Self {
            base_interval_ms: config.base_interval_ms(),
            background_interval_ms: config.background_interval_ms(),
            backoff_base_ms: config.backoff_base_ms(),
            backoff_multiplier: config.backoff_multiplier(),
            backoff_ceiling_ms: config.backoff_ceiling_ms(),
            stale_threshold_ms: config.stale_threshold_ms(),
            offline_threshold_ms: config.offline_threshold_ms(),
            diagnostic_ttl_ms: config.diagnostic_ttl_ms(),
        }
    }

    /// Backoff after one more failure: the base on the first failure,
    /// multiplied thereafter, never above the ceiling.
    pub fn next_backoff(&self, current_ms: f64) -> f64 {
        let next = if current_ms > 0.0 {
            current_ms * self.backoff_multiplier
        } else {
            self.backoff_base_ms as f64
        };
        next.min(self.backoff_ceiling_ms as f64)
    }

    pub fn interval_for(&self, hidden: bool) -> u64 {
        if hidden {
            self.background_interval_ms
        } else {
            self.base_interval_ms
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&PollConfig::default())
    }
}
