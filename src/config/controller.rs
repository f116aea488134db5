//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use super::{env_var_or_default, env_var_or_default_str};
use crate::constants::{
    DEFAULT_BACKOFF_MAX_MINUTES, DEFAULT_BACKOFF_MIN_MINUTES,
    DEFAULT_MAX_CONCURRENT_RECONCILIATIONS, DEFAULT_MAX_REQUEUE_SECS, DEFAULT_MIN_REQUEUE_SECS,
    DEFAULT_RESYNC_INTERVAL_SECS, DEFAULT_WATCH_RESTART_DELAY_SECS,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Lower clamp for self-scheduled requeues (seconds)
    pub min_requeue_secs: u64,
    /// Upper clamp for self-scheduled requeues (seconds)
    pub max_requeue_secs: u64,
    /// Requeue interval when targets exist but none is healthy (seconds)
    pub resync_interval_secs: u64,
    /// Fibonacci error backoff start (minutes)
    pub backoff_min_minutes: u64,
    /// Fibonacci error backoff cap (minutes)
    pub backoff_max_minutes: u64,
    /// Delay before restarting the watch stream after it ends (seconds)
    pub watch_restart_delay_secs: u64,
    /// Maximum concurrent reconciliations (0 means unbounded)
    pub max_concurrent_reconciliations: u16,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_requeue_secs: DEFAULT_MIN_REQUEUE_SECS,
            max_requeue_secs: DEFAULT_MAX_REQUEUE_SECS,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            backoff_min_minutes: DEFAULT_BACKOFF_MIN_MINUTES,
            backoff_max_minutes: DEFAULT_BACKOFF_MAX_MINUTES,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            log_format: "json".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self {
            min_requeue_secs: env_var_or_default("MIN_REQUEUE_SECS", DEFAULT_MIN_REQUEUE_SECS),
            max_requeue_secs: env_var_or_default("MAX_REQUEUE_SECS", DEFAULT_MAX_REQUEUE_SECS),
            resync_interval_secs: env_var_or_default(
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            backoff_min_minutes: env_var_or_default(
                "BACKOFF_MIN_MINUTES",
                DEFAULT_BACKOFF_MIN_MINUTES,
            ),
            backoff_max_minutes: env_var_or_default(
                "BACKOFF_MAX_MINUTES",
                DEFAULT_BACKOFF_MAX_MINUTES,
            ),
            watch_restart_delay_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            log_format: env_var_or_default_str("LOG_FORMAT", "json").to_lowercase(),
        };
        config.normalized()
    }

    /// Repair inverted bounds so the clamp below can never panic.
    fn normalized(mut self) -> Self {
        self.min_requeue_secs = self.min_requeue_secs.max(1);
        if self.max_requeue_secs < self.min_requeue_secs {
            self.max_requeue_secs = self.min_requeue_secs;
        }
        self.backoff_min_minutes = self.backoff_min_minutes.max(1);
        if self.backoff_max_minutes < self.backoff_min_minutes {
            self.backoff_max_minutes = self.backoff_min_minutes;
        }
        self
    }

    /// Clamp a self-scheduled delay into the configured requeue window
    #[must_use]
    pub fn clamp_requeue(&self, delay: Duration) -> Duration {
        delay.clamp(
            Duration::from_secs(self.min_requeue_secs),
            Duration::from_secs(self.max_requeue_secs),
        )
    }

    /// Get resync interval duration
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Get watch restart delay duration
    #[must_use]
    pub fn watch_restart_delay(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}
