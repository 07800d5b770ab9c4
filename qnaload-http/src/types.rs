//! Request payloads

use serde::{Deserialize, Serialize};

/// Body of `POST /api/answers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,

    /// Answering pipeline; omitted so the service uses its default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

impl QuestionRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            pipeline: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: Option<String>) -> Self {
        self.pipeline = pipeline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_without_pipeline() {
        let body = serde_json::to_value(QuestionRequest::new("What is X?")).unwrap();
        assert_eq!(body, json!({"question": "What is X?"}));
    }

    #[test]
    fn test_request_body_with_pipeline() {
        let request = QuestionRequest::new("How does Y work?").with_pipeline(Some("faq".into()));
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(body, json!({"question": "How does Y work?", "pipeline": "faq"}));
    }
}
