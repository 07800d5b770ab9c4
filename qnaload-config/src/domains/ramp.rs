//! Ramp profile configuration

use crate::domains::utils::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Stage curve driving the number of virtual users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Virtual users active when the run starts
    #[serde(default)]
    pub start_target: usize,

    /// How often the worker count is reconciled against the curve
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Ordered stages
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,
}

/// One `(duration, target)` stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub target: usize,
}

impl StageConfig {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// Parses the compact `DURATION:TARGET` form, e.g. `1m:10`
impl FromStr for StageConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (duration, target) = s.split_once(':').ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "Invalid stage '{}': expected DURATION:TARGET (e.g. 1m:10)",
                s
            ))
        })?;

        let duration = parse_duration(duration, "stage duration")?;
        let target = target.trim().parse().map_err(|e| {
            ConfigError::ValidationError(format!("Invalid stage target in '{}': {}", s, e))
        })?;

        Ok(Self { duration, target })
    }
}

impl fmt::Display for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            humantime::format_duration(self.duration),
            self.target
        )
    }
}

/// Parse a comma-separated list of stages, e.g. `1m:10,5m:50,1m:0`
pub fn parse_stage_list(value: &str) -> ConfigResult<Vec<StageConfig>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(StageConfig::from_str)
        .collect()
}

impl RampConfig {
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            start_target: 0,
            tick_interval: default_tick_interval(),
            stages: default_stages(),
        }
    }
}

impl Validatable for RampConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(self.validation_error("at least one stage must be configured"));
        }

        validate_positive(
            self.total_duration().as_millis(),
            "total stage duration (ms)",
            self.domain_name(),
        )?;

        validate_positive(
            self.tick_interval.as_millis(),
            "tick_interval (ms)",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "ramp"
    }
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

// Ramp to 10 users over a minute, on to 50 over five, then back down to zero
fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new(Duration::from_secs(60), 10),
        StageConfig::new(Duration::from_secs(300), 50),
        StageConfig::new(Duration::from_secs(60), 0),
    ]
}
