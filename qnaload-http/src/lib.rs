//! HTTP client functionality for qnaload
//!
//! This crate sends questions to the answering endpoint and captures the raw
//! status and body for the checks in `qnaload-core`. It also provides an
//! offline client for dry runs.

pub mod client;
pub mod config;
pub mod errors;
pub mod offline;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpQuestionClient, QuestionClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use offline::OfflineQuestionClient;
pub use types::QuestionRequest;
