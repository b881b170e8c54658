//! Grid geometry for forecast grids.
//!
//! Implements the two grid definitions the pipeline reads from scratch
//! without external dependencies: regular lat/lon and Lambert Conformal
//! Conic (the NBM CONUS grid).

pub mod lambert;
pub mod latlon;

pub use lambert::LambertConformal;
pub use latlon::LatLonGrid;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Grid has no points ({nx} x {ny})")]
    EmptyGrid { nx: usize, ny: usize },

    #[error("Invalid projection parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Maps grid indices to geographic coordinates.
///
/// `i` runs along a row (x), `j` across rows (y), both starting at the
/// first grid point.
pub trait GridGeometry {
    /// Grid dimensions as (nx, ny).
    fn dimensions(&self) -> (usize, usize);

    /// (lat, lon) in degrees of grid point (i, j).
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64);

    /// Latitude and longitude of every grid point, `i` varying fastest.
    fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        let (nx, ny) = self.dimensions();
        let mut lats = Vec::with_capacity(nx * ny);
        let mut lons = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (lat, lon) = self.grid_to_geo(i as f64, j as f64);
                lats.push(lat);
                lons.push(lon);
            }
        }
        (lats, lons)
    }
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
