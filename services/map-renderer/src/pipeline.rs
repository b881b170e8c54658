//! One rendering run: forecast in, annotated PNG out.

use std::path::{Path, PathBuf};

use eclipse_common::{ForecastMetadata, PointOfInterest, WeatherSample};
use region::run_pipeline;
use renderer::{Color, MapRenderer, MapScene, Overlay};
use tracing::info;

use crate::config::RenderConfig;
use crate::error::MapError;
use crate::layers::ReferenceLayers;

pub const MAP_TITLE: &str = "Forecasted Total Cloud Cover (%)";

/// GRIB2 short name of total cloud cover.
pub const TCC_PARAMETER: &str = "TCDC";

/// Input and output locations plus the bounds buffer.
#[derive(Debug, Clone)]
pub struct MapJob {
    pub forecast: PathBuf,
    pub metadata: PathBuf,
    pub out_dir: PathBuf,
    /// Degrees trimmed from each side of the configured bounds
    pub bounds_buffer: f64,
}

/// Encoded map with what went into it.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub png: Vec<u8>,
    pub samples: usize,
    pub points: Vec<PointOfInterest>,
}

#[derive(Debug, Clone)]
pub struct MapSummary {
    pub output: PathBuf,
    pub samples: usize,
    pub points: Vec<PointOfInterest>,
}

/// `{out_dir}/forecast_{cycle_dt}_f{actual_forecast_hour}.png`
pub fn output_path(out_dir: &Path, metadata: &ForecastMetadata) -> PathBuf {
    out_dir.join(metadata.output_file_name())
}

/// Filter, join and draw the given samples.
pub fn render_map(
    renderer: &MapRenderer,
    config: &RenderConfig,
    layers: &ReferenceLayers,
    samples: &[WeatherSample],
    bounds_buffer: f64,
) -> Result<RenderedMap, MapError> {
    let output = run_pipeline(
        samples,
        &config.plot_points,
        config.map_bounds.as_ref(),
        bounds_buffer,
        config.filter_query.as_ref(),
    );

    let scene = MapScene {
        title: MAP_TITLE,
        bounds: config.map_bounds,
        underlays: vec![Overlay {
            layer: &layers.states,
            color: Color::LIGHT_GREY,
        }],
        samples: &output.samples,
        overlays: vec![
            Overlay {
                layer: &layers.umbra,
                color: Color::STEEL_BLUE,
            },
            Overlay {
                layer: &layers.centerline,
                color: Color::RED,
            },
        ],
        points: &output.points,
    };
    let png = renderer.render_png(&scene)?;

    Ok(RenderedMap {
        png,
        samples: output.samples.len(),
        points: output.points,
    })
}

/// Load the forecast, render it and write the image named after the
/// metadata record.
pub async fn run(
    job: &MapJob,
    renderer: &MapRenderer,
    config: &RenderConfig,
    layers: &ReferenceLayers,
) -> Result<MapSummary, MapError> {
    let metadata =
        ForecastMetadata::read(&job.metadata).map_err(|e| MapError::input("metadata", e))?;
    let output = output_path(&job.out_dir, &metadata);

    let field = grib2_parser::load_field(&job.forecast, TCC_PARAMETER)?;
    let samples = field.samples();
    info!(
        forecast = %job.forecast.display(),
        samples = samples.len(),
        missing = field.missing_count(),
        "Loaded weather samples"
    );

    let map = render_map(renderer, config, layers, &samples, job.bounds_buffer)?;
    for point in &map.points {
        info!(name = %point.name, nearest_tcc = ?point.nearest_tcc, "Point of interest");
    }

    tokio::fs::create_dir_all(&job.out_dir)
        .await
        .map_err(|source| MapError::Output {
            path: job.out_dir.clone(),
            source,
        })?;
    tokio::fs::write(&output, &map.png)
        .await
        .map_err(|source| MapError::Output {
            path: output.clone(),
            source,
        })?;
    info!(path = %output.display(), bytes = map.png.len(), "Saved map");

    Ok(MapSummary {
        output,
        samples: map.samples,
        points: map.points,
    })
}
