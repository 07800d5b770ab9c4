//! Core error types for qnaload

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the question corpus.
///
/// Both variants are fatal: a run never starts without a usable corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be read
    #[error("Question corpus unavailable at {path}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus contained no non-blank lines
    #[error("Question corpus at {path} contains no usable entries")]
    EmptyCorpus { path: PathBuf },
}

/// Errors raised when building a ramp profile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RampError {
    #[error("Ramp profile must contain at least one stage")]
    NoStages,

    #[error("Ramp profile has zero total duration")]
    ZeroDuration,
}
