//! Virtual user loop
//!
//! A worker repeatedly samples a question, sends it, evaluates the response
//! and records the outcome, then waits out the pacing interval. A stop signal
//! is only observed at the pacing wait, so an in-flight request always
//! completes and is recorded.

use qnaload_core::{evaluate, Corpus, Metrics, RecordedRequest, RequestErrorKind};
use qnaload_http::{QuestionClient, QuestionRequest};
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// State shared by every worker of a run
pub(crate) struct WorkerContext {
    pub corpus: Corpus,
    pub client: Arc<dyn QuestionClient>,
    pub metrics: Arc<Metrics>,
    pub pacing: Duration,
    pub request_timeout: Duration,
    pub pipeline: Option<String>,
}

/// What a worker did before it exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub iterations: u64,
}

pub(crate) async fn run_worker(
    id: usize,
    ctx: Arc<WorkerContext>,
    mut rng: SmallRng,
    mut stop: watch::Receiver<bool>,
) -> WorkerReport {
    debug!("Worker {} started", id);

    let mut iterations = 0u64;
    let mut transport_errors = 0u64;

    loop {
        let question = ctx.corpus.sample(&mut rng).to_string();
        let request = QuestionRequest::new(question).with_pipeline(ctx.pipeline.clone());

        let recorded = execute(&ctx, &request).await;
        if let Some(kind) = recorded.error {
            transport_errors += 1;
            // First failure per worker at warn, the rest would flood the log
            if transport_errors == 1 {
                warn!("Worker {} request failed: {:?}", id, kind);
            } else {
                debug!("Worker {} request failed: {:?}", id, kind);
            }
        }
        ctx.metrics.record(&recorded);
        iterations += 1;

        let stopped = if ctx.pacing.is_zero() {
            tokio::task::yield_now().await;
            *stop.borrow()
        } else {
            tokio::select! {
                _ = tokio::time::sleep(ctx.pacing) => *stop.borrow(),
                changed = stop.changed() => changed.is_err() || *stop.borrow(),
            }
        };

        if stopped {
            break;
        }
    }

    ctx.metrics.worker_stopped();
    debug!(
        "Worker {} stopped after {} iterations ({} transport errors)",
        id, iterations, transport_errors
    );

    WorkerReport { id, iterations }
}

async fn execute(ctx: &WorkerContext, request: &QuestionRequest) -> RecordedRequest {
    let start = Instant::now();
    let outcome = tokio::time::timeout(ctx.request_timeout, ctx.client.ask(request)).await;
    let latency = start.elapsed();

    match outcome {
        Ok(Ok(response)) => {
            let checks = evaluate(&response);
            trace!(
                "Response {} in {:?}, {} checks failed",
                response.status,
                latency,
                checks.failures().count()
            );
            RecordedRequest::response(latency, response.status, checks)
        }
        Ok(Err(e)) => RecordedRequest::failed(latency, e.kind()),
        Err(_) => RecordedRequest::failed(latency, RequestErrorKind::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnaload_http::OfflineQuestionClient;
    use rand::SeedableRng;

    fn context(client: Arc<dyn QuestionClient>, pacing: Duration) -> Arc<WorkerContext> {
        Arc::new(WorkerContext {
            corpus: Corpus::from_lines(["What is X?", "Who is Y?"]).unwrap(),
            client,
            metrics: Arc::new(Metrics::new()),
            pacing,
            request_timeout: Duration::from_secs(2),
            pipeline: None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_paces_requests() {
        let ctx = context(Arc::new(OfflineQuestionClient::new()), Duration::from_secs(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        ctx.metrics.worker_started();

        let handle = tokio::spawn(run_worker(
            0,
            ctx.clone(),
            SmallRng::seed_from_u64(1),
            stop_rx,
        ));

        // Requests at t=0,1,2 then stopped during the third pacing wait
        tokio::time::sleep(Duration::from_millis(2500)).await;
        stop_tx.send(true).unwrap();
        let report = handle.await.unwrap();

        assert_eq!(report.iterations, 3);
        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.active_workers, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_pacing_wait() {
        let ctx = context(Arc::new(OfflineQuestionClient::new()), Duration::from_secs(60));
        let (stop_tx, stop_rx) = watch::channel(false);
        ctx.metrics.worker_started();

        let start = Instant::now();
        let handle = tokio::spawn(run_worker(
            0,
            ctx.clone(),
            SmallRng::seed_from_u64(1),
            stop_rx,
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        stop_tx.send(true).unwrap();
        let report = handle.await.unwrap();

        assert_eq!(report.iterations, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_request_completes_after_stop() {
        let client = Arc::new(OfflineQuestionClient::new().with_latency(Duration::from_millis(1500)));
        let ctx = context(client, Duration::from_secs(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        ctx.metrics.worker_started();

        let handle = tokio::spawn(run_worker(
            0,
            ctx.clone(),
            SmallRng::seed_from_u64(1),
            stop_rx,
        ));

        // Stop while the first request is still in flight
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop_tx.send(true).unwrap();
        let report = handle.await.unwrap();

        assert_eq!(report.iterations, 1);
        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.errors.total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_recorded_and_worker_continues() {
        let client = Arc::new(OfflineQuestionClient::new().with_latency(Duration::from_secs(10)));
        let ctx = context(client, Duration::from_secs(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        ctx.metrics.worker_started();

        let handle = tokio::spawn(run_worker(
            0,
            ctx.clone(),
            SmallRng::seed_from_u64(1),
            stop_rx,
        ));

        // Each iteration is a 2s timeout plus 1s pacing
        tokio::time::sleep(Duration::from_millis(5500)).await;
        stop_tx.send(true).unwrap();
        let report = handle.await.unwrap();

        assert_eq!(report.iterations, 2);
        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.errors.timeouts, 2);
        assert_eq!(snapshot.checks.len(), 4);
        for count in &snapshot.checks {
            assert_eq!(count.fails, 2);
            assert_eq!(count.passes, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_stop_sender_ends_worker() {
        let ctx = context(Arc::new(OfflineQuestionClient::new()), Duration::from_secs(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        ctx.metrics.worker_started();
        drop(stop_tx);

        let report = run_worker(7, ctx, SmallRng::seed_from_u64(1), stop_rx).await;
        assert_eq!(report, WorkerReport { id: 7, iterations: 1 });
    }
}
