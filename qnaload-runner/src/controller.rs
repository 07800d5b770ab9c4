//! Run controller
//!
//! Ticks at a fixed interval, asks the ramp profile for the current target and
//! phase, and reconciles the worker pool. When the profile completes (or an
//! external stop arrives) it drains the pool and finalizes the summary.

use crate::error::RunnerError;
use crate::pool::WorkerPool;
use crate::settings::RunSettings;
use crate::shutdown::StopReason;
use crate::worker::{WorkerContext, WorkerReport};
use chrono::Utc;
use qnaload_config::QnaloadConfig;
use qnaload_core::{Corpus, Metrics, RunPhase, RunSummary};
use qnaload_http::{HttpConfig, HttpQuestionClient, QuestionClient};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Phase change observed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub at: Duration,
    pub from: RunPhase,
    pub to: RunPhase,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub stop_reason: StopReason,
    pub transitions: Vec<PhaseTransition>,
    pub workers: Vec<WorkerReport>,
    /// Workers aborted because they outlived the drain timeout
    pub forced_stops: usize,
}

impl RunOutcome {
    pub fn completed(&self) -> bool {
        self.stop_reason == StopReason::Completed
    }
}

/// A configured load run, ready to start
pub struct LoadRun {
    settings: RunSettings,
    corpus: Corpus,
    client: Arc<dyn QuestionClient>,
    metrics: Arc<Metrics>,
}

impl LoadRun {
    pub fn new(settings: RunSettings, corpus: Corpus, client: Arc<dyn QuestionClient>) -> Self {
        Self {
            settings,
            corpus,
            client,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Load the corpus and build the HTTP client described by `config`
    pub fn from_config(config: &QnaloadConfig) -> Result<Self, RunnerError> {
        let settings = RunSettings::from_config(config)?;
        let corpus = Corpus::load(&config.corpus.path)?;
        info!(
            "Loaded {} questions from {}",
            corpus.len(),
            config.corpus.path.display()
        );

        let client = HttpQuestionClient::new(
            &config.target.url,
            &config.target.headers,
            &HttpConfig::from(config.http.clone()),
        )?;

        Ok(Self::new(settings, corpus, Arc::new(client)))
    }

    /// Replace the client, keeping everything else
    pub fn with_client(mut self, client: Arc<dyn QuestionClient>) -> Self {
        self.client = client;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Live metrics handle, usable while the run is in progress
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Run every stage of the profile
    pub async fn run(self) -> RunOutcome {
        self.run_until(std::future::pending()).await
    }

    /// Run the profile, stopping early if `stop` resolves first
    pub async fn run_until<F>(self, stop: F) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        let LoadRun {
            settings,
            corpus,
            client,
            metrics,
        } = self;
        let profile = &settings.profile;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            "Starting load run {}: {} stages over {:?}, peak {} workers",
            run_id,
            profile.stages().len(),
            profile.total_duration(),
            profile.peak_target()
        );

        let ctx = Arc::new(WorkerContext {
            corpus,
            client,
            metrics: metrics.clone(),
            pacing: settings.pacing,
            request_timeout: settings.request_timeout,
            pipeline: settings.pipeline.clone(),
        });
        let mut pool = WorkerPool::new(ctx, settings.seed);

        let start = Instant::now();
        let mut ticker = tokio::time::interval(settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_progress = start;
        let mut phase = RunPhase::Idle;
        let mut transitions = Vec::new();

        tokio::pin!(stop);
        let stop_reason = loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut stop => {
                    warn!("Stop requested at {:?}, ending run early", start.elapsed());
                    break StopReason::Interrupted;
                }
            }

            let elapsed = start.elapsed();
            let next = profile.phase_at(elapsed);
            if next != phase {
                info!("Run phase {} -> {} at {:?}", phase, next, elapsed);
                transitions.push(PhaseTransition {
                    at: elapsed,
                    from: phase,
                    to: next,
                });
                phase = next;
            }
            if phase.is_terminal() {
                break StopReason::Completed;
            }

            let target = profile.target_at(elapsed);
            pool.reconcile(target);

            if last_progress.elapsed() >= settings.progress_interval {
                last_progress = Instant::now();
                let snapshot = metrics.snapshot();
                info!(
                    "[{:?}] phase={} target={} live={} requests={} failed_checks={} errors={}",
                    elapsed,
                    phase,
                    target,
                    pool.live(),
                    snapshot.total_requests,
                    snapshot.failed_checks(),
                    snapshot.errors.total()
                );
            } else {
                debug!("Tick at {:?}: target={} live={}", elapsed, target, pool.live());
            }
        };

        let drained = pool.shutdown(settings.drain_timeout).await;
        let elapsed = start.elapsed();
        let summary = metrics.finalize(run_id, started_at, elapsed);

        info!(
            "Load run {} {} after {:?}: {} requests, {:.2}% checks passed",
            run_id,
            stop_reason,
            elapsed,
            summary.total_requests,
            summary.check_pass_rate() * 100.0
        );

        RunOutcome {
            summary,
            stop_reason,
            transitions,
            workers: drained.reports,
            forced_stops: drained.forced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnaload_core::{CapturedResponse, Check, RampProfile, Stage};
    use qnaload_http::OfflineQuestionClient;

    fn settings(stages: &[(u64, usize)]) -> RunSettings {
        let stages = stages
            .iter()
            .map(|&(secs, target)| Stage::new(Duration::from_secs(secs), target))
            .collect();
        let mut settings = RunSettings::new(RampProfile::new(0, stages).unwrap());
        settings.seed = Some(7);
        settings
    }

    fn corpus() -> Corpus {
        Corpus::from_lines(["What is X?", "Who is Y?", "Where is Z?"]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_stage_ramp_to_two_workers() {
        let client = Arc::new(OfflineQuestionClient::new());
        let run = LoadRun::new(settings(&[(10, 2)]), corpus(), client.clone());

        let outcome = run.run().await;

        assert!(outcome.completed());
        assert_eq!(outcome.summary.peak_workers, 2);
        assert_eq!(outcome.summary.workers_spawned, 2);
        assert_eq!(outcome.workers.len(), 2);
        assert!(outcome.workers.iter().all(|w| w.iterations >= 1));
        assert_eq!(outcome.forced_stops, 0);
        assert_eq!(outcome.summary.total_requests, client.calls());
        assert_eq!(outcome.summary.checks_failed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_sequence() {
        let run = LoadRun::new(
            settings(&[(3, 2), (3, 2), (3, 0)]),
            corpus(),
            Arc::new(OfflineQuestionClient::new()),
        );

        let outcome = run.run().await;
        let phases: Vec<RunPhase> = outcome.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            phases,
            vec![
                RunPhase::RampingUp,
                RunPhase::Steady,
                RunPhase::RampingDown,
                RunPhase::Completed
            ]
        );
        assert_eq!(outcome.transitions[0].from, RunPhase::Idle);
        assert_eq!(outcome.transitions[3].at, Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_follows_target() {
        let run = LoadRun::new(
            settings(&[(0, 4), (5, 4), (5, 1)]),
            corpus(),
            Arc::new(OfflineQuestionClient::new()),
        );
        let metrics = run.metrics();

        let handle = tokio::spawn(run.run());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(metrics.active_workers(), 4);

        let outcome = handle.await.unwrap();
        assert!(outcome.completed());
        assert_eq!(outcome.summary.peak_workers, 4);
        assert_eq!(metrics.active_workers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_stop_ends_run_early() {
        let run = LoadRun::new(
            settings(&[(600, 5)]),
            corpus(),
            Arc::new(OfflineQuestionClient::new()),
        );

        let start = Instant::now();
        let outcome = run
            .run_until(tokio::time::sleep(Duration::from_secs(30)))
            .await;

        assert_eq!(outcome.stop_reason, StopReason::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(35));
        assert!(outcome.summary.total_requests > 0);
        assert_eq!(outcome.forced_stops, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_checks_are_counted_not_fatal() {
        let client = Arc::new(OfflineQuestionClient::with_response(CapturedResponse::new(
            200,
            r#"{"answer": "", "class_1": "A"}"#,
        )));
        let run = LoadRun::new(settings(&[(5, 1)]), corpus(), client);

        let outcome = run.run().await;
        let summary = &outcome.summary;

        assert!(outcome.completed());
        assert!(summary.total_requests > 0);
        let status = summary.check(Check::Status200).unwrap();
        assert_eq!(status.fails, 0);
        let answer = summary.check(Check::ContainsAnswer).unwrap();
        assert_eq!(answer.passes, 0);
        assert_eq!(answer.fails, summary.total_requests);
        assert_eq!(
            summary.check(Check::ContainsClass1).unwrap().passes,
            summary.total_requests
        );
        assert_eq!(
            summary.check(Check::ContainsClass2).unwrap().fails,
            summary.total_requests
        );
    }

    #[test]
    fn test_from_config_reports_missing_corpus() {
        let mut config = QnaloadConfig::default();
        config.corpus.path = "/nonexistent/questions.txt".into();
        assert!(matches!(
            LoadRun::from_config(&config),
            Err(RunnerError::Corpus(_))
        ));
    }
}
