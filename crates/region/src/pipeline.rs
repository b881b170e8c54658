//! Filter and join ordering for one rendering run.

use eclipse_common::{MapBounds, PointOfInterest, WeatherSample};
use tracing::info;

use crate::bounds::filter_by_bounds;
use crate::join::nearest_join;
use crate::query::{filter_by_query, Query};

/// Samples left for plotting and the points with their joined values.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub samples: Vec<WeatherSample>,
    pub points: Vec<PointOfInterest>,
}

/// Bounds filter (when bounds are set), then query filter (when a query is
/// set), then the nearest join against whatever survived.
pub fn run_pipeline(
    samples: &[WeatherSample],
    points: &[PointOfInterest],
    bounds: Option<&MapBounds>,
    buffer: f64,
    query: Option<&Query>,
) -> PipelineOutput {
    let mut filtered = match bounds {
        Some(bounds) => filter_by_bounds(samples, bounds, buffer),
        None => samples.to_vec(),
    };

    if let Some(query) = query {
        filtered = filter_by_query(&filtered, query);
    }

    let points = nearest_join(points, &filtered);

    info!(
        input = samples.len(),
        kept = filtered.len(),
        points = points.len(),
        bounded = bounds.is_some(),
        query = query.map(|q| q.source()),
        "Region pipeline complete"
    );

    PipelineOutput {
        samples: filtered,
        points,
    }
}
