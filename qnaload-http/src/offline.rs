//! Offline client that answers every question locally
//!
//! Used for dry runs of a ramp profile and in tests: no request leaves the
//! process, every question gets the same canned response after an optional
//! simulated latency.

use crate::client::QuestionClient;
use crate::errors::HttpError;
use crate::types::QuestionRequest;
use qnaload_core::CapturedResponse;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

#[derive(Debug)]
pub struct OfflineQuestionClient {
    response: CapturedResponse,
    latency: Duration,
    calls: AtomicU64,
}

impl OfflineQuestionClient {
    /// Client returning a well-formed answer for every question
    pub fn new() -> Self {
        let body = json!({
            "id": "offline",
            "answer": "offline answer",
            "class_1": "OFFLINE",
            "class_2": "OFFLINE",
        });
        Self::with_response(CapturedResponse::new(200, body.to_string()))
    }

    pub fn with_response(response: CapturedResponse) -> Self {
        Self {
            response,
            latency: Duration::ZERO,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of questions answered so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for OfflineQuestionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QuestionClient for OfflineQuestionClient {
    async fn ask(&self, request: &QuestionRequest) -> Result<CapturedResponse, HttpError> {
        trace!("Offline answer for question={:?}", request.question);
        self.calls.fetch_add(1, Ordering::Relaxed);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnaload_core::evaluate;

    #[tokio::test]
    async fn test_default_response_passes_checks() {
        let client = OfflineQuestionClient::new();
        let response = client.ask(&QuestionRequest::new("q")).await.unwrap();
        assert!(evaluate(&response).all_passed());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency() {
        let client = OfflineQuestionClient::new().with_latency(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        client.ask(&QuestionRequest::new("q")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
