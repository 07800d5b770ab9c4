//! Question corpus configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the questions come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Newline-delimited text file, one question per line
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl Validatable for CorpusConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.path.to_string_lossy(), "path", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "corpus"
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("questions.txt")
}
