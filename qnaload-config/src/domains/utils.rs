//! Utility functions and helpers for configuration

use crate::error::{ConfigError, ConfigResult};
use std::time::Duration;

/// Parse a humantime duration such as `30s`, `1m` or `1h30m`
pub fn parse_duration(value: &str, field_name: &str) -> ConfigResult<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| ConfigError::ValidationError(format!("Invalid {}: '{}' ({})", field_name, value, e)))
}

/// Default functions for serde
pub fn default_true() -> bool {
    true
}
