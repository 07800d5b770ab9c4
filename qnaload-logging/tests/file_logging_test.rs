use qnaload_config::{LogFormat, LoggingConfig};
use qnaload_logging::init_logging_from_config;
use tempfile::tempdir;

// Only one test in this binary may install the global subscriber
#[test]
fn test_file_sink_receives_events() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("logs").join("qnaload.log");

    let config = LoggingConfig {
        format: LogFormat::Json,
        file: Some(log_path.clone()),
        ..LoggingConfig::default()
    };

    let guard = init_logging_from_config(&config, Some("info")).unwrap();
    tracing::info!(requests = 3, "load run finished");
    tracing::debug!("filtered out");
    drop(guard);

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let line = contents.lines().next().expect("one log line");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "INFO");
    assert_eq!(event["fields"]["message"], "load run finished");
    assert_eq!(event["fields"]["requests"], 3);
    assert!(!contents.contains("filtered out"));
}
