//! Forecast resolver.
//!
//! Finds the newest NBM cycle, picks the forecast file closest to the
//! eclipse and downloads it next to a `latest_info.json` record.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use eclipse_common::{parse_utc_time, ECLIPSE_DATETIME};
use resolver::{run, Archive, HttpArchive, LocalArchive, RunConfig, DEFAULT_ARCHIVE_URL};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "resolver")]
#[command(about = "Download the latest National Blend of Models forecast for the eclipse")]
struct Args {
    /// Base URL of the blend archive
    #[arg(long, env = "ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL)]
    archive_url: String,

    /// Read from a local mirror of the archive instead of HTTP
    #[arg(long, env = "LOCAL_ARCHIVE")]
    local_archive: Option<PathBuf>,

    /// Directory for the forecast file and its metadata
    #[arg(long, env = "FORECAST_DIR", default_value = "data/forecast")]
    output_dir: PathBuf,

    /// Event time the forecast should cover
    #[arg(long, default_value = ECLIPSE_DATETIME)]
    target_time: String,

    /// Number of forecast hours to try, counting down from the desired one
    #[arg(long, default_value = "6")]
    max_fallback: usize,

    /// Timeout for each archive request, in seconds
    #[arg(long, default_value = "600")]
    timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json")]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format)?;

    let target_time = parse_utc_time(&args.target_time)
        .with_context(|| format!("Invalid --target-time '{}'", args.target_time))?;

    let archive: Box<dyn Archive> = match &args.local_archive {
        Some(root) => Box::new(LocalArchive::new(root)),
        None => Box::new(HttpArchive::new(
            &args.archive_url,
            Duration::from_secs(args.timeout_secs),
        )?),
    };

    let config = RunConfig {
        output_dir: args.output_dir,
        target_time,
        max_fallback: args.max_fallback,
    };

    let summary = run(archive.as_ref(), &config).await?;
    info!(
        cycle = %summary.metadata.latest_cycle,
        estimated_forecast_hour = summary.metadata.estimated_forecast_hour,
        actual_forecast_hour = summary.metadata.actual_forecast_hour,
        metadata = %summary.metadata_path.display(),
        "Resolver finished"
    );
    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}
