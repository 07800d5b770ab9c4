//! Resolved settings for one run

use crate::error::RunnerError;
use qnaload_config::QnaloadConfig;
use qnaload_core::{RampProfile, Stage};
use std::time::Duration;

/// Everything the controller and workers need, resolved from configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub profile: RampProfile,
    pub tick_interval: Duration,
    pub pacing: Duration,
    pub request_timeout: Duration,
    pub drain_timeout: Duration,
    pub progress_interval: Duration,
    pub pipeline: Option<String>,
    pub seed: Option<u64>,
}

impl RunSettings {
    /// Settings with the default cadence for the given profile
    pub fn new(profile: RampProfile) -> Self {
        Self {
            profile,
            tick_interval: Duration::from_secs(1),
            pacing: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            drain_timeout: Duration::from_secs(30),
            progress_interval: Duration::from_secs(10),
            pipeline: None,
            seed: None,
        }
    }

    pub fn from_config(config: &QnaloadConfig) -> Result<Self, RunnerError> {
        let stages = config
            .ramp
            .stages
            .iter()
            .map(|s| Stage::new(s.duration, s.target))
            .collect();
        let profile = RampProfile::new(config.ramp.start_target, stages)?;

        Ok(Self {
            profile,
            tick_interval: config.ramp.tick_interval,
            pacing: config.worker.pacing,
            request_timeout: config.http.timeout,
            drain_timeout: config.worker.drain_timeout,
            progress_interval: config.worker.progress_interval,
            pipeline: config.target.pipeline.clone(),
            seed: config.worker.seed,
        })
    }
}
