//! Nearest-neighbour join of forecast samples onto points of interest.
//!
//! Distance is planar Euclidean in raw lon/lat degrees. Ties go to the
//! sample found first in grid order.

use eclipse_common::{PointOfInterest, WeatherSample};
use tracing::debug;

/// Lookup of the sample closest to a location.
///
/// Implementations must return the same sample a linear scan would,
/// including the first-found tie break.
pub trait NearestSearch {
    fn nearest(&self, lon: f64, lat: f64) -> Option<&WeatherSample>;
}

/// Brute-force search over every sample.
pub struct LinearScan<'a> {
    samples: &'a [WeatherSample],
}

impl<'a> LinearScan<'a> {
    pub fn new(samples: &'a [WeatherSample]) -> Self {
        Self { samples }
    }
}

impl NearestSearch for LinearScan<'_> {
    fn nearest(&self, lon: f64, lat: f64) -> Option<&WeatherSample> {
        let mut best: Option<&WeatherSample> = None;
        let mut best_dist = f64::INFINITY;

        for sample in self.samples {
            let dx = sample.lon - lon;
            let dy = sample.lat - lat;
            let dist = dx * dx + dy * dy;
            // Strict so an equally close later sample never replaces the first
            if dist < best_dist {
                best_dist = dist;
                best = Some(sample);
            }
        }
        best
    }
}

/// Attach the nearest sample's cloud cover to every point.
///
/// With no samples every point keeps `nearest_tcc == None`.
pub fn nearest_join(points: &[PointOfInterest], samples: &[WeatherSample]) -> Vec<PointOfInterest> {
    nearest_join_with(points, &LinearScan::new(samples))
}

/// [`nearest_join`] over any search structure.
pub fn nearest_join_with<S: NearestSearch>(
    points: &[PointOfInterest],
    search: &S,
) -> Vec<PointOfInterest> {
    points
        .iter()
        .map(|point| {
            let nearest = search.nearest(point.lon, point.lat);
            debug!(
                name = %point.name,
                lon = point.lon,
                lat = point.lat,
                nearest_lon = nearest.map(|s| s.lon),
                nearest_lat = nearest.map(|s| s.lat),
                tcc = nearest.map(|s| s.tcc),
                "Joined point of interest"
            );
            PointOfInterest {
                nearest_tcc: nearest.map(|s| s.tcc),
                ..point.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_minimum_distance() {
        let samples = vec![
            WeatherSample::new(30.0, -100.0, 10.0),
            WeatherSample::new(32.0, -97.0, 20.0),
            WeatherSample::new(35.0, -90.0, 30.0),
        ];
        let points = vec![PointOfInterest::new("Dallas", -96.8, 32.8)];

        let joined = nearest_join(&points, &samples);
        assert_eq!(joined[0].nearest_tcc, Some(20.0));
        assert_eq!(joined[0].name, "Dallas");
    }

    #[test]
    fn test_tie_goes_to_first_sample() {
        let samples = vec![
            WeatherSample::new(0.0, -1.0, 11.0),
            WeatherSample::new(0.0, 1.0, 22.0),
        ];
        let points = vec![PointOfInterest::new("Midpoint", 0.0, 0.0)];

        assert_eq!(nearest_join(&points, &samples)[0].nearest_tcc, Some(11.0));
    }

    #[test]
    fn test_empty_samples_leave_values_unset() {
        let points = vec![
            PointOfInterest::new("A", 0.0, 0.0),
            PointOfInterest::new("B", 1.0, 1.0),
        ];
        let joined = nearest_join(&points, &[]);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|p| p.nearest_tcc.is_none()));
    }

    #[test]
    fn test_distance_is_planar_degrees() {
        // No latitude weighting: 9 degrees north is closer than 10 east
        let samples = vec![
            WeatherSample::new(0.0, 10.0, 1.0),
            WeatherSample::new(9.0, 0.0, 2.0),
        ];
        let points = vec![PointOfInterest::new("Origin", 0.0, 0.0)];
        assert_eq!(nearest_join(&points, &samples)[0].nearest_tcc, Some(2.0));
    }

    #[test]
    fn test_nan_sample_is_never_nearest() {
        let samples = vec![
            WeatherSample::new(f64::NAN, 0.0, 99.0),
            WeatherSample::new(5.0, 5.0, 7.0),
        ];
        let search = LinearScan::new(&samples);
        assert_eq!(search.nearest(0.0, 0.0).map(|s| s.tcc), Some(7.0));
    }
}
