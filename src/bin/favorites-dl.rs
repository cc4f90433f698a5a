//! Command line front end: download a user's favorites into a directory.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use favorites_dl::{Config, FavoritesFetcher};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "favorites-dl.log";
const LOG_FILTER_ENV: &str = "FAVORITES_DL_LOG";
const REPORT_FILE: &str = "favorites.json";

/// Download every favorite of a DeviantArt user.
#[derive(Debug, Parser)]
#[command(name = "favorites-dl", version)]
#[command(about = "Download a user's favorites and write a JSON report", long_about = None)]
struct Cli {
    /// Whose favorites to download.
    username: String,

    /// Directory to download into (default: a new temporary directory).
    #[arg(long, short, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent downloads.
    #[arg(long, short, default_value = "4", value_name = "N")]
    workers: usize,

    /// Also look for and keep a larger variant of each item.
    #[arg(long)]
    large_variants: bool,

    /// Where to write the JSON report (default: <DIR>/favorites.json).
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

/// Log to `favorites-dl.log` in the working directory, filtered by `FAVORITES_DL_LOG`.
fn init_logging() -> std::io::Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;

    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled, can't open {LOG_FILE}: {e}");
    }
    tracing::info!(?cli, "Start");

    let username = cli.username.trim();
    if username.is_empty() {
        eprintln!("Username can't be empty");
        return ExitCode::from(1);
    }

    let output = match cli.output {
        Some(dir) => dir,
        None => match tempfile::Builder::new().prefix("favorites-").tempdir() {
            Ok(dir) => dir.keep(),
            Err(e) => {
                eprintln!("Failed to create a temporary directory: {e}");
                tracing::error!(error = %e, "Failed to create a temporary directory");
                return ExitCode::from(2);
            }
        },
    };

    let mut config = Config::default();
    config.download.worker_count = cli.workers;
    config.large_variant.enabled = cli.large_variants;
    let fetcher = match FavoritesFetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(config = ?fetcher.config(), output = %output.display(), "Fetcher configured");

    let report = match fetcher.fetch_favorites(username, &output).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed: {e}");
            tracing::error!(error = %e, "Fetch failed");
            return ExitCode::from(2);
        }
    };
    tracing::info!(count = report.len(), "Favorites fetched");

    let report_path = cli.report.unwrap_or_else(|| output.join(REPORT_FILE));
    if let Err(e) = report.save_json(&report_path).await {
        eprintln!("Failed to write the report: {e}");
        tracing::error!(error = %e, "Done, failed");
        return ExitCode::from(3);
    }

    println!(
        "Done. {} favorites downloaded to {}.",
        report.len(),
        output.display()
    );
    tracing::info!("Done");
    ExitCode::SUCCESS
}
