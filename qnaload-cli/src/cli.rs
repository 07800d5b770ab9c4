//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand};
use qnaload_config::{parse_duration, QnaloadConfig, StageConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "qnaload", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a staged load test against the answering endpoint
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

/// Flags for `run`; each one overrides the file and environment value
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Endpoint that receives the questions
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Question file, one question per line
    #[arg(long, value_name = "PATH")]
    pub questions: Option<PathBuf>,

    /// Ramp stage, repeatable (example: --stage 1m:10 --stage 5m:50 --stage 1m:0)
    #[arg(long = "stage", value_name = "DURATION:TARGET")]
    pub stages: Vec<StageConfig>,

    /// Pause between iterations of one worker
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub pacing: Option<Duration>,

    /// Pipeline name sent with every question
    #[arg(long, value_name = "NAME")]
    pub pipeline: Option<String>,

    /// Seed for reproducible question order
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    /// Answer locally instead of sending requests (dry run of the profile)
    #[arg(long)]
    pub offline: bool,
}

impl RunArgs {
    /// Apply flags on top of an already loaded configuration
    pub fn apply(&self, config: &mut QnaloadConfig) {
        if let Some(ref url) = self.url {
            config.target.url = url.clone();
        }
        if let Some(ref questions) = self.questions {
            config.corpus.path = questions.clone();
        }
        if !self.stages.is_empty() {
            config.ramp.stages = self.stages.clone();
        }
        if let Some(pacing) = self.pacing {
            config.worker.pacing = pacing;
        }
        if let Some(ref pipeline) = self.pipeline {
            config.target.pipeline = Some(pipeline.clone());
        }
        if let Some(seed) = self.seed {
            config.worker.seed = Some(seed);
        }
    }
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value, "duration").map_err(|e| e.to_string())
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file with the default scenario
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Path to configuration file (optional, uses default loading logic)
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,

        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}
