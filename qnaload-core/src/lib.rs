//! Core domain types for qnaload
//!
//! This crate holds the pieces of a load run that do not touch the network:
//! the question corpus, the ramp profile that decides how many virtual users
//! should be active, the checks applied to each answer, and the metrics that
//! aggregate their outcomes.

pub mod checks;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod ramp;

// Re-export commonly used types at the crate root
pub use checks::{evaluate, CapturedResponse, Check, CheckResults};
pub use corpus::Corpus;
pub use error::{CorpusError, RampError};
pub use metrics::{
    CheckCount, ErrorCounts, LatencyStats, Metrics, MetricsSnapshot, RecordedRequest,
    RequestErrorKind, RunSummary,
};
pub use ramp::{RampProfile, RunPhase, Stage};
