//! Ramp profile: how many virtual users should be active at a given instant

use crate::error::RampError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One stage of a ramp profile.
///
/// During the stage the target moves linearly from the previous stage's
/// target (or the profile's start target) to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// Run-level state, driven purely by elapsed time against the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunPhase {
    Idle,
    RampingUp,
    Steady,
    RampingDown,
    Completed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::RampingUp => "ramping-up",
            RunPhase::Steady => "steady",
            RunPhase::RampingDown => "ramping-down",
            RunPhase::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered stages plus the initial target, immutable once a run starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RampProfile {
    start_target: usize,
    stages: Vec<Stage>,
    #[serde(with = "humantime_serde")]
    total: Duration,
}

/// Where an elapsed time falls inside the profile
struct StagePosition {
    from: usize,
    to: usize,
    fraction: f64,
}

impl RampProfile {
    pub fn new(start_target: usize, stages: Vec<Stage>) -> Result<Self, RampError> {
        if stages.is_empty() {
            return Err(RampError::NoStages);
        }

        let total: Duration = stages.iter().map(|s| s.duration).sum();
        if total.is_zero() {
            return Err(RampError::ZeroDuration);
        }

        Ok(Self {
            start_target,
            stages,
            total,
        })
    }

    pub fn start_target(&self) -> usize {
        self.start_target
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// Highest target reached anywhere in the profile
    pub fn peak_target(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.target)
            .fold(self.start_target, usize::max)
    }

    // Stages are closed on the left and open on the right. Zero-length
    // stages are never "inside", so they act as instant jumps.
    fn position(&self, elapsed: Duration) -> Option<StagePosition> {
        if elapsed >= self.total {
            return None;
        }

        let mut from = self.start_target;
        let mut stage_start = Duration::ZERO;

        for stage in &self.stages {
            let stage_end = stage_start + stage.duration;
            if elapsed < stage_end {
                let offset = elapsed.saturating_sub(stage_start);
                return Some(StagePosition {
                    from,
                    to: stage.target,
                    fraction: offset.as_secs_f64() / stage.duration.as_secs_f64(),
                });
            }
            from = stage.target;
            stage_start = stage_end;
        }

        None
    }

    /// Interpolated target at `elapsed`, before rounding
    pub fn exact_target_at(&self, elapsed: Duration) -> f64 {
        match self.position(elapsed) {
            Some(pos) => {
                let from = pos.from as f64;
                let to = pos.to as f64;
                from + (to - from) * pos.fraction
            }
            None => 0.0,
        }
    }

    /// Number of workers that should be active at `elapsed`.
    ///
    /// Halves round up; at or after the end of the profile this is 0.
    pub fn target_at(&self, elapsed: Duration) -> usize {
        self.exact_target_at(elapsed).round() as usize
    }

    /// Run phase at `elapsed`. Never returns [`RunPhase::Idle`]; that is the
    /// controller's state before the clock starts.
    pub fn phase_at(&self, elapsed: Duration) -> RunPhase {
        match self.position(elapsed) {
            Some(pos) if pos.to > pos.from => RunPhase::RampingUp,
            Some(pos) if pos.to < pos.from => RunPhase::RampingDown,
            Some(_) => RunPhase::Steady,
            None => RunPhase::Completed,
        }
    }
}
