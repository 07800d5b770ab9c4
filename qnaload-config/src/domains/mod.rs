//! Domain-specific configuration modules

pub mod corpus;
pub mod http;
pub mod logging;
pub mod ramp;
pub mod target;
pub mod utils;
pub mod worker;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main qnaload configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QnaloadConfig {
    /// Endpoint under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Question source
    #[serde(default)]
    pub corpus: corpus::CorpusConfig,

    /// Stage curve
    #[serde(default)]
    pub ramp: ramp::RampConfig,

    /// Virtual user behaviour
    #[serde(default)]
    pub worker: worker::WorkerConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl QnaloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.corpus.validate()?;
        self.ramp.validate()?;
        self.worker.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = QnaloadConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
