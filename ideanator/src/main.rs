//! Ideanator - ARISE idea interrogation
//!
//! CLI entry point for interactive and batch runs.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, error, info};

use ideanator::cli::{Cli, Command};
use ideanator::config::Config;
use ideanator::events::{PipelineEvent, create_event_bus};
use ideanator::interactive::{InteractiveSession, render_event};
use ideanator::llm::create_client;
use ideanator::pipeline::Pipeline;
use ideanator::store::{BatchSummary, ResultStore, load_ideas};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ideanator")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("ideanator.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level first so warnings from the config fallback chain reach the log
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.seed.is_some() {
        config.pipeline.seed = cli.seed;
    }

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Interactive { idea, output } => cmd_interactive(&config, idea, output).await,
        Command::Batch { file, output } => cmd_batch(&config, &file, output).await,
        Command::Config => cmd_config(&config),
    }
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let pipeline = Pipeline::from_config(config, llm, create_event_bus()).context("Failed to build pipeline")?;
    Ok(pipeline)
}

async fn cmd_interactive(config: &Config, idea: Option<String>, output: Option<PathBuf>) -> Result<()> {
    debug!(has_idea = idea.is_some(), ?output, "cmd_interactive: called");
    let session = InteractiveSession::new(build_pipeline(config)?);

    let Some(result) = session.run(idea).await? else {
        println!("Goodbye!");
        return Ok(());
    };

    if let Some(path) = output {
        let mut store = ResultStore::new(path);
        store.append(result).await?;
        println!("\nSaved to {}", store.path().display().to_string().bright_green());
    }
    Ok(())
}

async fn cmd_batch(config: &Config, file: &PathBuf, output: Option<PathBuf>) -> Result<()> {
    debug!(?file, ?output, "cmd_batch: called");
    let ideas = load_ideas(file).await?;
    let pipeline = build_pipeline(config)?;
    let mut store = ResultStore::new(output.unwrap_or_else(|| config.output.path.clone()));

    // Progress printer: phase headers and status lines only
    let mut rx = pipeline.events().subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if matches!(
                event,
                PipelineEvent::Status { .. } | PipelineEvent::PhaseStarted { .. } | PipelineEvent::GenericFlagged { .. }
            ) && let Some(text) = render_event(&event)
            {
                println!("{}", text);
            }
        }
    });

    for (i, idea) in ideas.iter().enumerate() {
        println!(
            "\n{} {}",
            format!("[{}/{}]", i + 1, ideas.len()).bright_cyan().bold(),
            idea
        );
        match pipeline.run_simulated(idea).await {
            Ok(result) => {
                println!(
                    "{} {} phases, coverage {}, confidence {:.2}",
                    "✓".bright_green(),
                    result.phases_executed.len(),
                    result.final_coverage.score(),
                    result.refactored.validation.confidence
                );
                store.append(result).await?;
            }
            Err(e) => {
                error!(idea = i + 1, error = %e, "Batch run failed");
                printer.abort();
                return Err(e).context(format!(
                    "Idea {} failed; {} earlier result(s) saved to {}",
                    i + 1,
                    store.results().len(),
                    store.path().display()
                ));
            }
        }
    }
    printer.abort();

    let summary = BatchSummary::from_results(store.results());
    println!("\n{}", "Batch summary".bright_cyan().bold());
    println!("{}", summary);
    println!("Results: {}", store.path().display());
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", serde_yaml::to_string(config).context("Failed to serialize config")?);
    match config.llm.resolve() {
        Ok(resolved) => {
            println!("# resolved: backend={} model={} base-url={}", resolved.backend, resolved.model, resolved.base_url)
        }
        Err(e) => println!("# unresolved: {}", e),
    }
    Ok(())
}
