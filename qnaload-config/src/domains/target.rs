//! Target endpoint configuration

use crate::error::ConfigResult;
use crate::validation::{validate_http_url, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The question-answering endpoint under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Full URL requests are POSTed to
    #[serde(default = "default_url")]
    pub url: String,

    /// Answering pipeline to route questions to; the service picks its
    /// default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    /// Extra headers sent with every request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            pipeline: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_http_url(&self.url, "url", self.domain_name())?;

        if let Some(ref pipeline) = self.pipeline {
            validate_required_string(pipeline, "pipeline", self.domain_name())?;
        }

        for name in self.headers.keys() {
            validate_required_string(name, "header name", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_url() -> String {
    "http://localhost:8080/api/answers".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let config = TargetConfig::default();
        assert_eq!(config.url, "http://localhost:8080/api/answers");
        assert!(config.pipeline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_validation() {
        let mut config = TargetConfig::default();
        config.url = "localhost:8080".to_string();
        assert!(config.validate().is_err());

        config = TargetConfig::default();
        config.pipeline = Some("  ".to_string());
        assert!(config.validate().is_err());

        config = TargetConfig::default();
        config.headers.insert(String::new(), "x".to_string());
        assert!(config.validate().is_err());
    }
}
