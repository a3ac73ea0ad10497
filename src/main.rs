use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relmirror::{Config, GitHubProvider, GiteeProvider, HttpFetcher, OutputSink, SyncEngine};

/// Fixed pause between upload retry attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "relmirror")]
#[command(about = "Mirror releases and assets from GitHub to Gitee")]
#[command(version)]
struct Cli {
    /// Verbose request/response logging (also enabled by the `debug`
    /// environment setting)
    #[arg(short, long)]
    debug: bool,

    /// Staging directory for downloaded assets (defaults to the current
    /// directory)
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Compute and print the sync plan without executing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration errors abort before any network activity.
    let mut config = Config::from_env().context("invalid configuration")?;
    if cli.debug {
        config.debug = true;
    }

    init_logging(config.debug)?;

    if config.debug {
        debug!("gitee_owner : {}", config.gitee_owner);
        debug!("gitee_repo : {}", config.gitee_repo);
        debug!("github_owner : {}", config.github_owner);
        debug!("github_repo : {}", config.github_repo);
        debug!("gitee_token : {}", config.masked_token());
    }

    let staging_dir = match cli.staging_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    let engine = SyncEngine::new(
        GitHubProvider::new(&config),
        GiteeProvider::new(&config),
        HttpFetcher::new(staging_dir),
        OutputSink::from_env(),
        config.upload_retry_times,
        RETRY_BACKOFF,
    );

    if cli.dry_run {
        let plan = engine.plan().await.context("failed to compute sync plan")?;
        for action in &plan {
            println!("{action}");
        }
        info!("dry-run: {} action(s) pending", plan.len());
        return Ok(());
    }

    let summary = engine.run().await.context("sync pass failed")?;

    if summary.releases_failed > 0 || summary.assets_failed > 0 {
        info!(
            "completed with {} release failure(s) and {} asset failure(s); \
             the next run will retry the remaining work",
            summary.releases_failed, summary.assets_failed
        );
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}
