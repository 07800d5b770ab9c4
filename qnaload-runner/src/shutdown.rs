//! Draining stopped workers
//!
//! Stopping is graceful first: a signalled worker finishes its in-flight
//! request and exits at its next pacing wait. Workers still running when the
//! drain timeout expires are aborted.

use crate::pool::WorkerHandle;
use crate::worker::WorkerReport;
use qnaload_core::Metrics;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every stage of the ramp profile elapsed
    Completed,
    /// An external stop request arrived before the profile finished
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Result of draining a set of workers
#[derive(Debug, Default)]
pub struct DrainOutcome {
    pub reports: Vec<WorkerReport>,
    /// Workers aborted after the drain timeout
    pub forced: usize,
}

/// Wait for already-signalled workers, aborting any that outlive `timeout`
pub(crate) async fn drain_workers(
    handles: Vec<WorkerHandle>,
    timeout: Duration,
    metrics: &Metrics,
) -> DrainOutcome {
    let mut outcome = DrainOutcome::default();
    if handles.is_empty() {
        return outcome;
    }

    info!(
        "Draining {} workers (timeout {:?})",
        handles.len(),
        timeout
    );
    let deadline = Instant::now() + timeout;

    for mut handle in handles {
        match tokio::time::timeout_at(deadline, &mut handle.task).await {
            Ok(Ok(report)) => outcome.reports.push(report),
            Ok(Err(e)) => {
                // A panicked worker never reached its own bookkeeping
                error!("Worker {} terminated abnormally: {}", handle.id, e);
                metrics.worker_stopped();
            }
            Err(_) => {
                handle.task.abort();
                metrics.worker_stopped();
                outcome.forced += 1;
            }
        }
    }

    if outcome.forced > 0 {
        warn!(
            "Drain timeout expired, aborted {} workers with requests still in flight",
            outcome.forced
        );
    } else {
        info!("All workers drained");
    }

    outcome
}
