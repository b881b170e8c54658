//! Regular latitude/longitude grid (GRIB2 grid template 3.0).

use crate::{normalize_lon, GridGeometry, ProjectionError};

/// Equidistant cylindrical grid.
///
/// Increments are signed: a grid scanning north to south carries a
/// negative `dlat`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    /// Latitude of the first grid point (degrees)
    pub lat1: f64,
    /// Longitude of the first grid point (degrees)
    pub lon1: f64,
    /// Latitude step per row (degrees)
    pub dlat: f64,
    /// Longitude step per column (degrees)
    pub dlon: f64,
    pub nx: usize,
    pub ny: usize,
}

impl LatLonGrid {
    pub fn new(
        lat1: f64,
        lon1: f64,
        dlat: f64,
        dlon: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, ProjectionError> {
        if nx == 0 || ny == 0 {
            return Err(ProjectionError::EmptyGrid { nx, ny });
        }
        if !dlat.is_finite() {
            return Err(ProjectionError::InvalidParameter {
                name: "dlat",
                value: dlat,
            });
        }
        if !dlon.is_finite() {
            return Err(ProjectionError::InvalidParameter {
                name: "dlon",
                value: dlon,
            });
        }
        Ok(Self {
            lat1,
            lon1,
            dlat,
            dlon,
            nx,
            ny,
        })
    }
}

impl GridGeometry for LatLonGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let lat = self.lat1 + j * self.dlat;
        let lon = normalize_lon(self.lon1 + i * self.dlon);
        (lat, lon)
    }
}
