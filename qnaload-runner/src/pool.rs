//! Worker pool sized to the ramp target

use crate::shutdown::{drain_workers, DrainOutcome};
use crate::worker::{run_worker, WorkerContext, WorkerReport};
use futures::FutureExt;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub(crate) struct WorkerHandle {
    pub id: usize,
    pub stop: watch::Sender<bool>,
    pub task: JoinHandle<WorkerReport>,
}

/// Workers spawned and stopped by one reconcile call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolChange {
    pub spawned: usize,
    pub stopped: usize,
}

/// Owns the running workers of a run.
///
/// Workers are stopped newest first. Stopped workers keep running until
/// their in-flight request is recorded and are reaped on later reconciles.
pub struct WorkerPool {
    ctx: Arc<WorkerContext>,
    seed: Option<u64>,
    next_id: usize,
    active: Vec<WorkerHandle>,
    draining: Vec<WorkerHandle>,
    reports: Vec<WorkerReport>,
}

impl WorkerPool {
    pub(crate) fn new(ctx: Arc<WorkerContext>, seed: Option<u64>) -> Self {
        Self {
            ctx,
            seed,
            next_id: 0,
            active: Vec::new(),
            draining: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Workers that have not been told to stop
    pub fn live(&self) -> usize {
        self.active.len()
    }

    /// Stopped workers still finishing their last request
    pub fn draining(&self) -> usize {
        self.draining.len()
    }

    /// Spawn or stop workers until `live()` equals `target`
    pub fn reconcile(&mut self, target: usize) -> PoolChange {
        self.reap();

        let mut change = PoolChange::default();
        while self.active.len() < target {
            self.spawn();
            change.spawned += 1;
        }
        while self.active.len() > target {
            if let Some(handle) = self.active.pop() {
                // Send only fails once the worker is gone, reaping covers that
                let _ = handle.stop.send(true);
                self.draining.push(handle);
                change.stopped += 1;
            }
        }

        if change.spawned > 0 || change.stopped > 0 {
            debug!(
                "Pool reconciled to {} workers (+{} -{}, {} draining)",
                target,
                change.spawned,
                change.stopped,
                self.draining.len()
            );
        }
        change
    }

    /// Stop every worker and wait for them to drain
    pub async fn shutdown(mut self, drain_timeout: Duration) -> DrainOutcome {
        self.reap();
        for handle in self.active.drain(..) {
            let _ = handle.stop.send(true);
            self.draining.push(handle);
        }

        let mut outcome =
            drain_workers(std::mem::take(&mut self.draining), drain_timeout, &self.ctx.metrics)
                .await;
        outcome.reports.append(&mut self.reports);
        outcome.reports.sort_by_key(|r| r.id);
        outcome
    }

    fn spawn(&mut self) {
        let id = self.next_id;
        self.next_id += 1;

        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => SmallRng::from_os_rng(),
        };
        let (stop, stop_rx) = watch::channel(false);

        self.ctx.metrics.worker_started();
        let task = tokio::spawn(run_worker(id, self.ctx.clone(), rng, stop_rx));
        self.active.push(WorkerHandle { id, stop, task });
    }

    /// Collect workers that have exited
    fn reap(&mut self) {
        let metrics = &self.ctx.metrics;
        let reports = &mut self.reports;

        let mut collect = |handle: &mut WorkerHandle| -> bool {
            if !handle.task.is_finished() {
                return false;
            }
            match (&mut handle.task).now_or_never() {
                Some(Ok(report)) => reports.push(report),
                Some(Err(e)) => {
                    error!("Worker {} terminated abnormally: {}", handle.id, e);
                    metrics.worker_stopped();
                }
                None => return false,
            }
            true
        };

        self.draining.retain_mut(|h| !collect(h));
        self.active.retain_mut(|h| !collect(h));
    }
}
