//! Viewport filter.

use eclipse_common::{MapBounds, WeatherSample};
use tracing::debug;

/// Keep the samples strictly inside `bounds` shrunk by `buffer` degrees on
/// every side.
///
/// Samples on a shrunk edge are dropped. A buffer larger than half the
/// bounds leaves nothing, which is not an error.
pub fn filter_by_bounds(
    samples: &[WeatherSample],
    bounds: &MapBounds,
    buffer: f64,
) -> Vec<WeatherSample> {
    let kept: Vec<WeatherSample> = samples
        .iter()
        .filter(|s| bounds.contains_strict(s.lon, s.lat, buffer))
        .copied()
        .collect();

    debug!(
        lon_min = bounds.lon_min,
        lon_max = bounds.lon_max,
        lat_min = bounds.lat_min,
        lat_max = bounds.lat_max,
        buffer,
        input = samples.len(),
        kept = kept.len(),
        "Applied bounds filter"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::regular_sample_grid;

    #[test]
    fn test_keeps_interior_only() {
        let samples = regular_sample_grid(-100.0, 30.0, 1.0, 5, 5, |_, _| 50.0);
        let bounds = MapBounds::new(-100.0, -96.0, 30.0, 34.0);

        let kept = filter_by_bounds(&samples, &bounds, 0.0);

        assert_eq!(kept.len(), 9);
        assert!(kept
            .iter()
            .all(|s| s.lon > -100.0 && s.lon < -96.0 && s.lat > 30.0 && s.lat < 34.0));
    }

    #[test]
    fn test_buffer_shrinks_bounds() {
        let samples = regular_sample_grid(-100.0, 30.0, 1.0, 5, 5, |_, _| 50.0);
        let bounds = MapBounds::new(-100.0, -96.0, 30.0, 34.0);

        let kept = filter_by_bounds(&samples, &bounds, 1.0);

        assert_eq!(kept, vec![WeatherSample::new(32.0, -98.0, 50.0)]);
    }

    #[test]
    fn test_sample_on_buffered_edge_is_dropped() {
        let bounds = MapBounds::new(-100.0, -96.0, 30.0, 34.0);
        let samples = vec![
            WeatherSample::new(32.0, -99.5, 10.0),
            WeatherSample::new(33.5, -98.0, 20.0),
            WeatherSample::new(32.0, -99.49, 30.0),
            WeatherSample::new(33.49, -96.51, 40.0),
        ];

        let kept = filter_by_bounds(&samples, &bounds, 0.5);

        assert_eq!(kept, samples[2..].to_vec());
    }

    #[test]
    fn test_oversized_buffer_is_empty() {
        let samples = regular_sample_grid(-100.0, 30.0, 1.0, 5, 5, |_, _| 50.0);
        let bounds = MapBounds::new(-100.0, -96.0, 30.0, 34.0);

        assert!(filter_by_bounds(&samples, &bounds, 10.0).is_empty());
    }

    #[test]
    fn test_preserves_grid_order() {
        let samples = regular_sample_grid(0.0, 0.0, 1.0, 4, 4, |col, row| (row * 4 + col) as f32);
        let bounds = MapBounds::new(0.0, 3.0, 0.0, 3.0);

        let values: Vec<f32> = filter_by_bounds(&samples, &bounds, 0.0)
            .iter()
            .map(|s| s.tcc)
            .collect();
        assert_eq!(values, vec![5.0, 6.0, 9.0, 10.0]);
    }
}
