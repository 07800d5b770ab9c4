//! Virtual user configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-worker pacing and shutdown behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Sleep between iterations of a worker; zero disables pacing
    #[serde(with = "humantime_serde", default = "default_pacing")]
    pub pacing: Duration,

    /// How long stopped workers get to finish their in-flight request
    #[serde(with = "humantime_serde", default = "default_drain_timeout")]
    pub drain_timeout: Duration,

    /// Interval between progress log lines
    #[serde(with = "humantime_serde", default = "default_progress_interval")]
    pub progress_interval: Duration,

    /// Seed for question sampling; each worker derives its own stream from it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pacing: default_pacing(),
            drain_timeout: default_drain_timeout(),
            progress_interval: default_progress_interval(),
            seed: None,
        }
    }
}

impl Validatable for WorkerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.drain_timeout.as_millis(),
            "drain_timeout (ms)",
            self.domain_name(),
        )?;

        validate_positive(
            self.progress_interval.as_millis(),
            "progress_interval (ms)",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "worker"
    }
}

fn default_pacing() -> Duration {
    Duration::from_secs(1)
}

fn default_drain_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_progress_interval() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.pacing, Duration::from_secs(1));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_pacing_is_allowed() {
        let config = WorkerConfig {
            pacing: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_validation() {
        let config = WorkerConfig {
            drain_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
