//! Map renderer binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use eclipse_common::metadata::{FORECAST_FILE_NAME, METADATA_FILE_NAME};
use map_renderer::{run, LayerPaths, MapJob, ReferenceLayers, RenderConfig, DEFAULT_CONFIG_PATH};
use renderer::{LabelFont, MapRenderer, RenderOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "map-renderer")]
#[command(about = "Render the forecasted cloud cover for the eclipse as an annotated map")]
struct Args {
    /// Render configuration (points, bounds, filter query)
    #[arg(long, env = "RENDER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Forecast downloaded by the resolver
    #[arg(long)]
    forecast: Option<PathBuf>,

    /// Metadata record written by the resolver
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Directory holding the resolver output
    #[arg(long, env = "FORECAST_DIR", default_value = "data/forecast")]
    forecast_dir: PathBuf,

    /// State boundaries (GeoJSON)
    #[arg(long)]
    base_map: Option<PathBuf>,

    /// Eclipse centerline (GeoJSON)
    #[arg(long)]
    centerline: Option<PathBuf>,

    /// Umbra path outline (GeoJSON)
    #[arg(long)]
    umbra: Option<PathBuf>,

    /// Output directory for the map image
    #[arg(long, env = "OUT_DIR", default_value = "data/out")]
    out_dir: PathBuf,

    /// Degrees trimmed from each side of the configured map bounds
    #[arg(long, default_value = "0.5")]
    bounds_buffer: f64,

    /// TrueType font for labels and title
    #[arg(long, env = "MAP_FONT")]
    font: Option<PathBuf>,

    /// Edge length of the square image in pixels
    #[arg(long, default_value = "2400")]
    size: u32,

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

    info!("Loading config");
    let config = RenderConfig::load(&args.config).await?;

    info!("Loading reference layers");
    let defaults = LayerPaths::default();
    let layers = ReferenceLayers::load(&LayerPaths {
        base_map: args.base_map.unwrap_or(defaults.base_map),
        centerline: args.centerline.unwrap_or(defaults.centerline),
        umbra: args.umbra.unwrap_or(defaults.umbra),
    })?;

    let font = match &args.font {
        Some(path) => match LabelFont::from_file(path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "Could not load font");
                None
            }
        },
        None => None,
    };
    let renderer = MapRenderer::new(
        RenderOptions {
            size: args.size,
            ..RenderOptions::default()
        },
        font,
    );

    let job = MapJob {
        forecast: args
            .forecast
            .unwrap_or_else(|| args.forecast_dir.join(FORECAST_FILE_NAME)),
        metadata: args
            .metadata
            .unwrap_or_else(|| args.forecast_dir.join(METADATA_FILE_NAME)),
        out_dir: args.out_dir,
        bounds_buffer: args.bounds_buffer,
    };

    let summary = run(&job, &renderer, &config, &layers).await?;
    info!(
        path = %summary.output.display(),
        samples = summary.samples,
        points = summary.points.len(),
        "Done"
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
