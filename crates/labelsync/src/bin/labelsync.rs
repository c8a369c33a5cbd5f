//! labelsync CLI - converge GitHub repository labels onto a YAML manifest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labelsync::manifest::load_manifest;
use labelsync::reconcile::{SyncOptions, Syncer};
use labelsync::remote::github::GithubClient;

/// Reconcile GitHub repository labels against a declarative manifest.
#[derive(Parser)]
#[command(name = "labelsync")]
#[command(about = "Sync GitHub labels from a YAML manifest")]
struct Cli {
    /// GitHub token (or set `GITHUB_TOKEN` env var).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to the label manifest.
    #[arg(short, long)]
    manifest: PathBuf,

    /// Delete remote labels that are absent from the manifest.
    #[arg(long, default_value = "false")]
    prune: bool,

    /// Regex excluding current labels from sync consideration.
    #[arg(long)]
    exclude: Option<String>,

    /// Report intended actions without mutating anything.
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Repositories to sync, as OWNER/REPO.
    #[arg(required = true, value_name = "OWNER/REPO")]
    repositories: Vec<String>,
}

/// Split an `OWNER/REPO` argument into its two parts.
fn split_repository(spec: &str) -> Result<(&str, &str)> {
    spec.split_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
        .with_context(|| format!("invalid repository '{spec}', expected OWNER/REPO"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let desired = load_manifest(&cli.manifest)
        .with_context(|| format!("failed to load manifest {}", cli.manifest.display()))?;
    info!(
        manifest = %cli.manifest.display(),
        labels = desired.len(),
        "loaded manifest"
    );

    let client = GithubClient::new(cli.token.clone()).context("failed to create GitHub client")?;
    let syncer = Syncer::new(client);

    let opts = SyncOptions {
        prune: cli.prune,
        exclude_pattern: cli.exclude.clone(),
        dry_run: cli.dry_run,
    };

    for spec in &cli.repositories {
        let (owner, repo) = split_repository(spec)?;
        info!(owner = %owner, repo = %repo, dry_run = cli.dry_run, "syncing labels");
        syncer
            .sync(owner, repo, &desired, &opts)
            .await
            .with_context(|| format!("failed to sync {spec}"))?;
    }

    Ok(())
}
