//! Domain-driven configuration management for qnaload
//!
//! Configuration is split by functional domain (target, corpus, ramp,
//! worker, http, logging), each with its own defaults and validation.
//! Values come from defaults, then an optional YAML file, then `QNALOAD_*`
//! environment variables.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    corpus::CorpusConfig,
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    ramp::{parse_stage_list, RampConfig, StageConfig},
    target::TargetConfig,
    worker::WorkerConfig,
    QnaloadConfig,
};

// Re-export utilities
pub use domains::utils::parse_duration;
