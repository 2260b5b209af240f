//! Kubernetes application resource evaluator CLI
//!
//! A command-line tool for checking per-replica resource headroom,
//! storage compatibility and deploy readiness against a cluster snapshot.

mod client;
mod commands;
mod config;
mod output;
mod snapshot;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client::SnapshotSource;
use commands::{cluster, compat, headroom, validate};
use evaluator_lib::QuotaEvaluator;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Kubernetes application resource evaluator
#[derive(Parser)]
#[command(name = "kres")]
#[command(author, version, about = "Resource headroom and deploy checks for Kubernetes applications", long_about = None)]
pub struct Cli {
    /// Snapshot file to evaluate (takes precedence over --url)
    #[arg(long, short, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Snapshot endpoint URL (can also be set via KRES_SNAPSHOT_URL env var)
    #[arg(long, global = true, env = "KRES_SNAPSHOT_URL")]
    pub url: Option<String>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the allowable per-replica CPU and memory range
    Headroom,

    /// Show what the persisted storage allows
    Compat,

    /// Check whether the application can be deployed
    Validate,

    /// Show cluster capacity against scheduled pod requests
    Cluster,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn resolve_source(cli: &Cli, config: &config::Config) -> Result<SnapshotSource> {
    if let Some(path) = &cli.snapshot {
        return Ok(SnapshotSource::File(path.clone()));
    }

    match cli.url.as_deref().or(config.snapshot_url.as_deref()) {
        Some(url) => Ok(SnapshotSource::Url(client::parse_url(url)?)),
        None => bail!("No snapshot given; pass --snapshot <path> or --url <url>"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration
    let config = config::Config::load()?;
    let evaluator = QuotaEvaluator::new(config.quota_policy());
    debug!(policy = ?evaluator.policy(), "Evaluator configured");

    let source = resolve_source(&cli, &config)?;
    let snapshot = source.load().await?;
    debug!(
        nodes = snapshot.nodes.len() + snapshot.k8s_nodes.len(),
        pods = snapshot.pods.len(),
        edit = snapshot.is_edit(),
        "Snapshot loaded"
    );

    // Execute command
    match cli.command {
        Commands::Headroom => headroom::show_headroom(&snapshot, &evaluator, cli.format)?,
        Commands::Compat => compat::show_compatibility(&snapshot, cli.format)?,
        Commands::Validate => {
            if !validate::validate_form(&snapshot, &evaluator, cli.format)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Cluster => cluster::show_cluster(&snapshot, cli.format)?,
    }

    Ok(ExitCode::SUCCESS)
}
