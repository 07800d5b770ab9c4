//! End-to-end load runs against a mock answering service

use qnaload_core::{Check, Corpus, RampProfile, RunSummary, Stage};
use qnaload_http::{HttpConfig, HttpQuestionClient};
use qnaload_runner::{LoadRun, RunSettings, StopReason};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_settings(stages: &[(u64, usize)]) -> RunSettings {
    let stages = stages
        .iter()
        .map(|&(ms, target)| Stage::new(Duration::from_millis(ms), target))
        .collect();
    let mut settings = RunSettings::new(RampProfile::new(0, stages).unwrap());
    settings.tick_interval = Duration::from_millis(100);
    settings.pacing = Duration::from_millis(100);
    settings.request_timeout = Duration::from_secs(2);
    settings.drain_timeout = Duration::from_secs(5);
    settings.progress_interval = Duration::from_millis(500);
    settings.seed = Some(11);
    settings
}

fn corpus() -> Corpus {
    Corpus::from_lines(["What is X?", "How does Y work?"]).unwrap()
}

fn client_for(url: &str, timeout: Duration) -> Arc<HttpQuestionClient> {
    let config = HttpConfig {
        timeout,
        ..HttpConfig::default()
    };
    Arc::new(HttpQuestionClient::new(url, &BTreeMap::new(), &config).unwrap())
}

fn assert_check_totals(summary: &RunSummary) {
    assert_eq!(summary.checks.len(), 4);
    for count in &summary.checks {
        assert_eq!(
            count.passes + count.fails,
            summary.total_requests,
            "pass+fail mismatch for '{}'",
            count.name
        );
    }
}

#[tokio::test]
async fn test_healthy_service_passes_every_check() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/answers"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7f1c",
            "answer": "Y works by magic",
            "class_1": "HOWTO",
            "class_2": "GENERAL",
            "extra_fields": {"source": "kb"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&format!("{}/api/answers", server.uri()), Duration::from_secs(5));
    let run = LoadRun::new(fast_settings(&[(1000, 2), (1000, 2)]), corpus(), client);

    let outcome = run.run().await;
    let summary = &outcome.summary;

    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(outcome.forced_stops, 0);
    assert_eq!(summary.peak_workers, 2);
    assert!(outcome.workers.iter().all(|w| w.iterations >= 1));
    assert!(summary.total_requests > 0);
    assert_check_totals(summary);
    assert_eq!(summary.checks_failed(), 0);
    assert_eq!(summary.errors.total(), 0);
    assert_eq!(summary.status_codes.get(&200), Some(&summary.total_requests));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len() as u64, summary.total_requests);
    for request in &received {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let question = body["question"].as_str().unwrap();
        assert!(question == "What is X?" || question == "How does Y work?");
        assert!(body.get("pipeline").is_none());
    }
}

#[tokio::test]
async fn test_incomplete_answers_fail_field_checks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "",
            "class_1": "A",
            "class_2": "B"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let outcome = LoadRun::new(fast_settings(&[(800, 1)]), corpus(), client)
        .run()
        .await;
    let summary = &outcome.summary;

    assert!(summary.total_requests > 0);
    assert_check_totals(summary);
    assert_eq!(summary.check(Check::Status200).unwrap().fails, 0);
    assert_eq!(summary.check(Check::ContainsAnswer).unwrap().passes, 0);
    assert_eq!(summary.check(Check::ContainsClass1).unwrap().fails, 0);
    assert_eq!(summary.check(Check::ContainsClass2).unwrap().fails, 0);
}

#[tokio::test]
async fn test_server_errors_and_malformed_bodies_are_counted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>overloaded</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let outcome = LoadRun::new(fast_settings(&[(800, 1)]), corpus(), client)
        .run()
        .await;
    let summary = &outcome.summary;

    assert!(summary.total_requests > 0);
    assert_check_totals(summary);
    assert_eq!(summary.checks_passed(), 0);
    assert_eq!(summary.errors.total(), 0);
    assert_eq!(summary.status_codes.get(&503), Some(&summary.total_requests));
}

#[tokio::test]
async fn test_slow_service_records_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "a", "class_1": "b", "class_2": "c"}))
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_millis(200));
    let outcome = LoadRun::new(fast_settings(&[(600, 1)]), corpus(), client)
        .run()
        .await;
    let summary = &outcome.summary;

    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert!(summary.total_requests > 0);
    assert_eq!(summary.errors.timeouts, summary.total_requests);
    assert_eq!(summary.checks_passed(), 0);
    assert!(summary.status_codes.is_empty());
}

#[tokio::test]
async fn test_unreachable_service_does_not_stop_the_run() {
    // Nothing listens on the discard port
    let client = client_for("http://127.0.0.1:9/api/answers", Duration::from_secs(2));
    let outcome = LoadRun::new(fast_settings(&[(600, 2)]), corpus(), client)
        .run()
        .await;
    let summary = &outcome.summary;

    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert!(summary.total_requests > 0);
    assert_eq!(summary.errors.total(), summary.total_requests);
    assert_check_totals(summary);
    assert_eq!(summary.checks_passed(), 0);
}
