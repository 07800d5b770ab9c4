use anyhow::{bail, Context, Result};
use clap::Parser;
use qnaload_config::{ConfigLoader, QnaloadConfig};
use qnaload_http::OfflineQuestionClient;
use qnaload_logging::{init_logging_from_config, init_simple_tracing};
use qnaload_runner::LoadRun;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

mod cli;
mod report;
use cli::{Cli, Commands, ConfigCommands, RunArgs};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<QnaloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            loader
                .from_file(path)
                .context(format!("Failed to load configuration from {:?}", path))
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Run the configured load profile and print the summary
async fn run_command(
    config_path: Option<&PathBuf>,
    log_level: Option<&str>,
    args: &RunArgs,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    config
        .validate_all()
        .context("Invalid run configuration")?;

    let _guard = init_logging_from_config(&config.logging, log_level)?;
    info!("qnaload {} starting", env!("CARGO_PKG_VERSION"));

    let mut run = LoadRun::from_config(&config).context("Failed to prepare load run")?;
    if args.offline {
        info!("Offline mode: questions are answered locally, no requests are sent");
        run = run.with_client(Arc::new(OfflineQuestionClient::new()));
    } else {
        info!("Target: {}", config.target.url);
    }

    let outcome = run
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    print!("{}", report::render_summary(&outcome));

    if let Some(ref path) = args.summary_json {
        report::write_summary_json(path, &outcome.summary)?;
        info!("Summary written to {:?}", path);
    }

    if !outcome.completed() {
        bail!("Load run {} before all stages completed", outcome.stop_reason);
    }

    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(config) => {
            println!("✅ Configuration file is valid");
            println!(
                "   {} stages over {}s, target {}",
                config.ramp.stages.len(),
                config.ramp.total_duration().as_secs(),
                config.target.url
            );
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, QnaloadConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Configuration generated at: {:?}", output);
    println!(
        "🔧 Validate with: qnaload config validate --config-file {:?}",
        output
    );

    Ok(())
}

/// Handle configuration display
fn handle_config_show(config_file: Option<&PathBuf>, format: &str) -> Result<()> {
    let config = load_config(config_file)?;

    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml_output =
                serde_yaml::to_string(&config).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        "json" => {
            let json_output =
                serde_json::to_string_pretty(&config).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run(args)) => {
            run_command(cli.config.as_ref(), cli.log_level.as_deref(), args).await
        }
        Some(Commands::Config { config_cmd }) => {
            init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
            match config_cmd {
                ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
                ConfigCommands::Generate { output, force } => {
                    handle_config_generate(output, *force)
                }
                ConfigCommands::Show {
                    config_file,
                    format,
                } => handle_config_show(config_file.as_ref().or(cli.config.as_ref()), format),
            }
        }
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
