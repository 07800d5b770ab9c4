//! Runner error types

use qnaload_core::{CorpusError, RampError};
use qnaload_http::HttpError;
use thiserror::Error;

/// Errors that prevent a run from starting.
///
/// Per-request failures never surface here; they are recorded in the metrics.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid ramp profile: {0}")]
    InvalidProfile(#[from] RampError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] HttpError),
}
