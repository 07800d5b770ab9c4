//! Configuration loading and environment variable handling

use crate::domains::ramp::parse_stage_list;
use crate::domains::utils::parse_duration;
use crate::domains::QnaloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "QNALOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<QnaloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: QnaloadConfig = serde_yaml::from_str(&content)?;

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config)?;

        // Validate all domains
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<QnaloadConfig> {
        let mut config = QnaloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<QnaloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut QnaloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_corpus_overrides(&mut config.corpus)?;
        self.apply_ramp_overrides(&mut config.ramp)?;
        self.apply_worker_overrides(&mut config.worker)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("TARGET_URL") {
            config.url = url;
        }

        if let Ok(pipeline) = self.get_env_var("PIPELINE") {
            config.pipeline = Some(pipeline).filter(|p| !p.trim().is_empty());
        }

        Ok(())
    }

    fn apply_corpus_overrides(
        &self,
        config: &mut crate::domains::corpus::CorpusConfig,
    ) -> ConfigResult<()> {
        if let Ok(path) = self.get_env_var("QUESTIONS") {
            config.path = PathBuf::from(path);
        }

        Ok(())
    }

    fn apply_ramp_overrides(
        &self,
        config: &mut crate::domains::ramp::RampConfig,
    ) -> ConfigResult<()> {
        if let Ok(stages) = self.get_env_var("STAGES") {
            config.stages = parse_stage_list(&stages)
                .map_err(|e| ConfigError::EnvError(format!("Invalid STAGES: {}", e)))?;
        }

        if let Ok(start) = self.get_env_var("START_TARGET") {
            config.start_target = start
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid START_TARGET: {}", e)))?;
        }

        Ok(())
    }

    fn apply_worker_overrides(
        &self,
        config: &mut crate::domains::worker::WorkerConfig,
    ) -> ConfigResult<()> {
        if let Ok(pacing) = self.get_env_var("PACING") {
            config.pacing = parse_duration(&pacing, "PACING")
                .map_err(|e| ConfigError::EnvError(e.to_string()))?;
        }

        if let Ok(seed) = self.get_env_var("SEED") {
            config.seed = Some(
                seed.parse()
                    .map_err(|e| ConfigError::EnvError(format!("Invalid SEED: {}", e)))?,
            );
        }

        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            config.timeout = parse_duration(&timeout, "HTTP_TIMEOUT")
                .map_err(|e| ConfigError::EnvError(e.to_string()))?;
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(verify_ssl) = self.get_env_var("HTTP_VERIFY_SSL") {
            config.verify_ssl = verify_ssl
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_VERIFY_SSL: {}", e)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
