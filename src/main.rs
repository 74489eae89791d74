use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rmrb_dl::batch::{BatchOrchestrator, CancelFlag};
use rmrb_dl::config::{Config, ProxyConfig};
use rmrb_dl::date::EditionDate;
use rmrb_dl::models::DateStatus;

/// Exit code for a user-initiated interruption
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "rmrb-dl",
    version,
    about = "People's Daily PDF edition downloader",
    long_about = None
)]
#[command(group(ArgGroup::new("selection").required(true).args(["date", "range"])))]
struct Cli {
    /// Edition date (YYYYMMDD, YYYY-MM-DD, YYYY/MM/DD, YYYY-MM/DD, YYYYMM/DD)
    #[arg(short, long)]
    date: Option<String>,

    /// Inclusive date range as two 8-digit dates (e.g. 20240101-20240105)
    #[arg(short, long)]
    range: Option<String>,

    /// Proxy server (scheme://host:port, schemes: http, https, socks5, socks5h)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Output directory for merged editions
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_tracing(&cli.log_format, cli.verbose) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Some(dir) = cli.output_dir {
        config.paths.output_dir = dir;
    }
    match &cli.proxy {
        Some(spec) => {
            let proxy = ProxyConfig::parse(spec)?;
            tracing::info!(proxy = %proxy, "proxy enabled");
            config.network.proxy = Some(proxy);
        }
        None => tracing::info!("proxy disabled"),
    }
    config.validate()?;

    std::fs::create_dir_all(&config.paths.output_dir)?;

    let cancel = CancelFlag::new();
    spawn_interrupt_watcher(cancel.clone());

    let orchestrator = BatchOrchestrator::new(&config, cancel.clone())?;

    if let Some(range) = &cli.range {
        let dates = EditionDate::parse_range(range)?;
        let report = orchestrator.run_range(&dates).await;
        if report.was_interrupted() {
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
        // the batch is complete once every date was attempted, even when
        // individual dates failed; per-date outcomes were logged above
        Ok(ExitCode::SUCCESS)
    } else {
        let date = EditionDate::parse(cli.date.as_deref())?;
        let outcome = orchestrator.run_date(date).await;
        match outcome.status {
            DateStatus::Completed { .. } | DateStatus::AlreadyExists => Ok(ExitCode::SUCCESS),
            DateStatus::Interrupted => Ok(ExitCode::from(EXIT_INTERRUPTED)),
            DateStatus::Failed { .. } => Ok(ExitCode::FAILURE),
        }
    }
}

/// Set the cancel flag on Ctrl-C; the pipeline observes it between pages
fn spawn_interrupt_watcher(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current page");
            cancel.cancel();
        }
    });
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("rmrb_dl=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("rmrb_dl=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
