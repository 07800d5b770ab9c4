//! Staged load execution for qnaload
//!
//! A [`LoadRun`] drives a pool of virtual users against a question-answering
//! endpoint, following a [`qnaload_core::RampProfile`]. Each worker owns its
//! RNG and stop channel; the controller only decides how many should exist.

pub mod controller;
pub mod error;
pub mod pool;
pub mod settings;
pub mod shutdown;
pub mod worker;

pub use controller::{LoadRun, PhaseTransition, RunOutcome};
pub use error::RunnerError;
pub use pool::{PoolChange, WorkerPool};
pub use settings::RunSettings;
pub use shutdown::{DrainOutcome, StopReason};
pub use worker::WorkerReport;
