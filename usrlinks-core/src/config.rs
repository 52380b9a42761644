//! Engine configuration types.
//!
//! Every field carries a default so a partial TOML/JSON payload only needs
//! to name the knobs it changes. The retry and reconciliation numbers are
//! tuned policy, not derived constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-probe attempt budget and backoff.
    pub retry: RetryConfig,
    /// Post-scan passes over indeterminate results.
    pub reconcile: ReconcileConfig,
    /// HTTP client timeouts and relay address.
    pub transport: TransportSettings,
    /// Worker pool sizing.
    pub scheduler: SchedulerConfig,
    /// Scan status retention.
    pub ledger: LedgerConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per probe, including the first.
    pub max_attempts: u32,
    /// Linear backoff step: after failed attempt `i` (zero based, the last
    /// one included) the probe sleeps `(i + 1) * backoff_step_ms`.
    pub backoff_step_ms: u64,
}

impl RetryConfig {
    pub fn backoff_after(&self, attempt_index: u32) -> Duration {
        Duration::from_millis(
            self.backoff_step_ms
                .saturating_mul(u64::from(attempt_index) + 1),
        )
    }

    /// Attempt count actually used; a zero budget still makes one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_ms: 1_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub max_rounds: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { max_rounds: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub request_timeout_secs: u64,
    pub avatar_timeout_secs: u64,
    /// SOCKS endpoint of the local anonymizing relay.
    pub relay_address: String,
}

impl TransportSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn avatar_timeout(&self) -> Duration {
        Duration::from_secs(self.avatar_timeout_secs)
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            avatar_timeout_secs: 10,
            relay_address: "127.0.0.1:9050".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pool size used when a request carries no hint. `0` fans out one
    /// task per endpoint.
    pub default_parallelism: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_parallelism: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Evict entries untouched for this long. `None` or `0` keeps them for
    /// the life of the process.
    pub ttl_secs: Option<u64>,
}

impl LedgerConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff_after(0), Duration::from_secs(1));
        assert_eq!(retry.backoff_after(1), Duration::from_secs(2));
        assert_eq!(retry.backoff_after(2), Duration::from_secs(3));
    }

    #[test]
    fn three_failures_back_off_six_steps() {
        let retry = RetryConfig::default();
        let total: Duration =
            (0..retry.attempts()).map(|i| retry.backoff_after(i)).sum();
        assert_eq!(total, Duration::from_secs(6));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [retry]
            backoff_step_ms = 0

            [ledger]
            ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_step_ms, 0);
        assert_eq!(config.reconcile.max_rounds, 2);
        assert_eq!(config.transport.relay_address, "127.0.0.1:9050");
        assert_eq!(config.ledger.ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_ttl_disables_eviction() {
        let ledger = LedgerConfig { ttl_secs: Some(0) };
        assert_eq!(ledger.ttl(), None);
    }
}
