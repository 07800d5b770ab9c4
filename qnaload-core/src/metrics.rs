//! Run-wide metrics aggregation
//!
//! Workers record every request through [`Metrics::record`]. Check outcomes,
//! latency, status code and transport errors for one request are applied under
//! a single lock, so a snapshot never sees half of a request.

use crate::checks::{Check, CheckResults};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Transport-level failure of a request that produced no response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestErrorKind {
    Timeout,
    Failed,
}

/// Everything recorded about one dispatched request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub latency: Duration,
    pub status: Option<u16>,
    pub checks: CheckResults,
    pub error: Option<RequestErrorKind>,
}

impl RecordedRequest {
    pub fn response(latency: Duration, status: u16, checks: CheckResults) -> Self {
        Self {
            latency,
            status: Some(status),
            checks,
            error: None,
        }
    }

    pub fn failed(latency: Duration, kind: RequestErrorKind) -> Self {
        Self {
            latency,
            status: None,
            checks: CheckResults::all_failed(),
            error: Some(kind),
        }
    }
}

/// Pass/fail counts for one named check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCount {
    pub check: Check,
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckCount {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passes as f64 / total as f64,
        }
    }
}

/// Transport error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounts {
    pub timeouts: u64,
    pub failures: u64,
}

impl ErrorCounts {
    pub fn total(&self) -> u64 {
        self.timeouts + self.failures
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    total_requests: u64,
    passes: [u64; 4],
    fails: [u64; 4],
    errors: ErrorCounts,
    status_codes: BTreeMap<u16, u64>,
    latencies: Vec<Duration>,
}

impl Accumulator {
    fn check_counts(&self) -> Vec<CheckCount> {
        Check::ALL
            .iter()
            .map(|&check| CheckCount {
                check,
                name: check.name().to_string(),
                passes: self.passes[check.index()],
                fails: self.fails[check.index()],
            })
            .collect()
    }
}

/// Point-in-time view of the metrics, safe to take while workers record
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub checks: Vec<CheckCount>,
    pub errors: ErrorCounts,
    pub active_workers: usize,
    pub peak_workers: usize,
    pub workers_spawned: u64,
}

impl MetricsSnapshot {
    /// Number of individual check failures across all checks
    pub fn failed_checks(&self) -> u64 {
        self.checks.iter().map(|c| c.fails).sum()
    }
}

/// Thread-safe accumulator shared by every worker
#[derive(Debug, Default)]
pub struct Metrics {
    inner: Mutex<Accumulator>,
    active_workers: AtomicUsize,
    peak_workers: AtomicUsize,
    workers_spawned: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one request
    pub fn record(&self, request: &RecordedRequest) {
        let mut acc = self.inner.lock();
        acc.total_requests += 1;

        for (check, ok) in request.checks.iter() {
            if ok {
                acc.passes[check.index()] += 1;
            } else {
                acc.fails[check.index()] += 1;
            }
        }

        if let Some(status) = request.status {
            *acc.status_codes.entry(status).or_insert(0) += 1;
        }

        match request.error {
            Some(RequestErrorKind::Timeout) => acc.errors.timeouts += 1,
            Some(RequestErrorKind::Failed) => acc.errors.failures += 1,
            None => {}
        }

        acc.latencies.push(request.latency);
    }

    pub fn worker_started(&self) {
        let active = self.active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_workers.fetch_max(active, Ordering::SeqCst);
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_stopped(&self) {
        // Never underflow if a stop is reported twice
        let _ = self
            .active_workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let acc = self.inner.lock();
        MetricsSnapshot {
            total_requests: acc.total_requests,
            checks: acc.check_counts(),
            errors: acc.errors,
            active_workers: self.active_workers.load(Ordering::SeqCst),
            peak_workers: self.peak_workers.load(Ordering::SeqCst),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
        }
    }

    /// Build the final report. Call once, after the last worker has stopped.
    pub fn finalize(&self, run_id: Uuid, started_at: DateTime<Utc>, elapsed: Duration) -> RunSummary {
        let acc = self.inner.lock();

        let mut latencies = acc.latencies.clone();
        latencies.sort_unstable();

        let requests_per_second = if elapsed.is_zero() {
            0.0
        } else {
            acc.total_requests as f64 / elapsed.as_secs_f64()
        };

        RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            elapsed,
            total_requests: acc.total_requests,
            requests_per_second,
            checks: acc.check_counts(),
            errors: acc.errors,
            status_codes: acc.status_codes.clone(),
            latency: LatencyStats::from_sorted(&latencies),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            peak_workers: self.peak_workers.load(Ordering::SeqCst),
        }
    }
}

/// Latency statistics in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub median_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencyStats {
    /// Compute stats from an ascending slice using nearest-rank percentiles
    pub fn from_sorted(sorted: &[Duration]) -> Self {
        if sorted.is_empty() {
            return Self::default();
        }

        let ms = |d: Duration| d.as_nanos() as f64 / 1_000_000.0;
        let percentile = |p: f64| {
            let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
            ms(sorted[rank.clamp(1, sorted.len()) - 1])
        };
        let sum: f64 = sorted.iter().copied().map(ms).sum();

        Self {
            min_ms: ms(sorted[0]),
            avg_ms: sum / sorted.len() as f64,
            median_ms: percentile(50.0),
            p90_ms: percentile(90.0),
            p95_ms: percentile(95.0),
            p99_ms: percentile(99.0),
            max_ms: ms(sorted[sorted.len() - 1]),
        }
    }
}

/// Final report of a load run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub total_requests: u64,
    pub requests_per_second: f64,
    pub checks: Vec<CheckCount>,
    pub errors: ErrorCounts,
    pub status_codes: BTreeMap<u16, u64>,
    pub latency: LatencyStats,
    pub workers_spawned: u64,
    pub peak_workers: usize,
}

impl RunSummary {
    pub fn check(&self, check: Check) -> Option<&CheckCount> {
        self.checks.iter().find(|c| c.check == check)
    }

    pub fn checks_passed(&self) -> u64 {
        self.checks.iter().map(|c| c.passes).sum()
    }

    pub fn checks_failed(&self) -> u64 {
        self.checks.iter().map(|c| c.fails).sum()
    }

    /// Share of all individual check evaluations that passed
    pub fn check_pass_rate(&self) -> f64 {
        let total = self.checks_passed() + self.checks_failed();
        if total == 0 {
            0.0
        } else {
            self.checks_passed() as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{evaluate, CapturedResponse};
    use std::sync::Arc;

    fn ok_request(ms: u64) -> RecordedRequest {
        let response = CapturedResponse::new(200, r#"{"answer":"a","class_1":"b","class_2":"c"}"#);
        RecordedRequest::response(Duration::from_millis(ms), 200, evaluate(&response))
    }

    #[test]
    fn test_record_counts_every_check() {
        let metrics = Metrics::new();
        metrics.record(&ok_request(10));
        metrics.record(&RecordedRequest::failed(
            Duration::from_millis(30),
            RequestErrorKind::Timeout,
        ));
        metrics.record(&RecordedRequest::response(
            Duration::from_millis(20),
            500,
            evaluate(&CapturedResponse::new(500, "oops")),
        ));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.checks.len(), 4);
        for count in &snapshot.checks {
            assert_eq!(count.total(), 3);
        }
        assert_eq!(snapshot.checks[0].passes, 1);
        assert_eq!(snapshot.errors.timeouts, 1);
        assert_eq!(snapshot.errors.failures, 0);
        assert_eq!(snapshot.failed_checks(), 8);
    }

    #[test]
    fn test_worker_gauges() {
        let metrics = Metrics::new();
        metrics.worker_started();
        metrics.worker_started();
        metrics.worker_stopped();
        metrics.worker_started();
        metrics.worker_stopped();
        metrics.worker_stopped();
        metrics.worker_stopped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_workers, 0);
        assert_eq!(snapshot.peak_workers, 2);
        assert_eq!(snapshot.workers_spawned, 3);
    }

    #[test]
    fn test_latency_percentiles() {
        let sorted: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        let stats = LatencyStats::from_sorted(&sorted);
        assert_eq!(stats.min_ms, 1.0);
        assert_eq!(stats.max_ms, 100.0);
        assert_eq!(stats.median_ms, 50.0);
        assert_eq!(stats.p90_ms, 90.0);
        assert_eq!(stats.p95_ms, 95.0);
        assert_eq!(stats.p99_ms, 99.0);
        assert!((stats.avg_ms - 50.5).abs() < 1e-9);

        assert_eq!(LatencyStats::from_sorted(&[]), LatencyStats::default());
        let single = LatencyStats::from_sorted(&[Duration::from_millis(7)]);
        assert_eq!(single.p99_ms, 7.0);
    }

    #[test]
    fn test_finalize_summary() {
        let metrics = Metrics::new();
        metrics.worker_started();
        for ms in [10, 20, 30, 40] {
            metrics.record(&ok_request(ms));
        }
        metrics.worker_stopped();

        let summary = metrics.finalize(Uuid::new_v4(), Utc::now(), Duration::from_secs(2));
        assert_eq!(summary.total_requests, 4);
        assert!((summary.requests_per_second - 2.0).abs() < 1e-9);
        assert_eq!(summary.status_codes.get(&200), Some(&4));
        assert_eq!(summary.checks_failed(), 0);
        assert_eq!(summary.check_pass_rate(), 1.0);
        assert_eq!(summary.check(Check::ContainsClass2).map(|c| c.passes), Some(4));
        assert_eq!(summary.latency.median_ms, 20.0);
        assert_eq!(summary.peak_workers, 1);
    }

    #[test]
    fn test_concurrent_recording_is_consistent() {
        let metrics = Arc::new(Metrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        metrics.record(&ok_request(i));
                        let snapshot = metrics.snapshot();
                        for count in &snapshot.checks {
                            assert_eq!(count.total(), snapshot.total_requests);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().total_requests, 2000);
    }
}
