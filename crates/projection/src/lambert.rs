//! Lambert Conformal Conic projection.
//!
//! The National Blend of Models CONUS grid is defined on this projection.
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! The projection parameters include:
//! - Central meridian (LoV in GRIB2)
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)
//! - Grid spacing: dx, dy in meters
//! - First grid point: lat1, lon1
//! - Earth radius, from the GRIB2 shape of the earth

use std::f64::consts::PI;

use crate::{normalize_lon, GridGeometry, ProjectionError};

/// Lambert Conformal Conic projection parameters.
///
/// These parameters define the projection from geographic (lat/lon) to
/// grid (i, j) coordinates and vice versa.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian (LoV) in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Latitude of first grid point in radians
    pub lat1: f64,
    /// Longitude of first grid point in radians
    pub lon1: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    /// Number of grid points in X (i) direction
    pub nx: usize,
    /// Number of grid points in Y (j) direction
    pub ny: usize,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at first grid point
    rho0: f64,
    /// First grid point in projection coordinates
    origin: (f64, f64),
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection from GRIB2 parameters.
    ///
    /// # Arguments
    /// * `lat1_deg` - Latitude of first grid point (degrees)
    /// * `lon1_deg` - Longitude of first grid point (degrees)
    /// * `lov_deg` - Central meridian / orientation of the grid (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    /// * `dx` - Grid spacing X (meters)
    /// * `dy` - Grid spacing Y (meters)
    /// * `nx` - Number of X grid points
    /// * `ny` - Number of Y grid points
    /// * `earth_radius` - Spherical earth radius (meters)
    #[allow(clippy::too_many_arguments)]
    pub fn from_grib2(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
        earth_radius: f64,
    ) -> Result<Self, ProjectionError> {
        if nx == 0 || ny == 0 {
            return Err(ProjectionError::EmptyGrid { nx, ny });
        }
        if !(dx > 0.0) {
            return Err(ProjectionError::InvalidParameter {
                name: "dx",
                value: dx,
            });
        }
        if !(dy > 0.0) {
            return Err(ProjectionError::InvalidParameter {
                name: "dy",
                value: dy,
            });
        }
        if !(earth_radius > 0.0) {
            return Err(ProjectionError::InvalidParameter {
                name: "earth_radius",
                value: earth_radius,
            });
        }

        let to_rad = PI / 180.0;

        let lat1 = lat1_deg * to_rad;
        let lon1 = lon1_deg * to_rad;
        let lon0 = lov_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };
        if n.abs() < 1e-12 || !n.is_finite() {
            return Err(ProjectionError::InvalidParameter {
                name: "latin1",
                value: latin1_deg,
            });
        }

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * wrap_pi(lon1 - lon0);
        let origin = (rho0 * theta0.sin(), rho0 - rho0 * theta0.cos());

        Ok(Self {
            lon0,
            latin1,
            latin2,
            lat1,
            lon1,
            dx,
            dy,
            nx,
            ny,
            earth_radius,
            n,
            f,
            rho0,
            origin,
        })
    }
}

impl GridGeometry for LambertConformal {
    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns (lat, lon) in degrees.
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let (x0, y0) = self.origin;
        let x = x0 + i * self.dx;
        let y = y0 + j * self.dy;

        let sign = self.n.signum();
        let rho = sign * (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let theta = (sign * x).atan2(sign * (self.rho0 - y));

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat * to_deg, normalize_lon(lon * to_deg))
    }
}

fn wrap_pi(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    impl LambertConformal {
        /// Forward projection, the inverse of `grid_to_geo`.
        fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
            let to_rad = PI / 180.0;
            let lat = lat_deg * to_rad;
            let lon = lon_deg * to_rad;

            let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
            let theta = self.n * wrap_pi(lon - self.lon0);

            let x = rho * theta.sin();
            let y = self.rho0 - rho * theta.cos();

            let (x0, y0) = self.origin;
            ((x - x0) / self.dx, (y - y0) / self.dy)
        }
    }

    /// NBM CONUS 2.5 km grid.
    fn nbm_conus() -> LambertConformal {
        LambertConformal::from_grib2(
            19.228976,  // lat1
            -126.276552, // lon1 (233.723448 - 360)
            -95.0,      // LoV (265 - 360)
            25.0,       // latin1
            25.0,       // latin2
            2539.703,   // dx
            2539.703,   // dy
            2345,       // nx
            1597,       // ny
            6371200.0,  // earth radius
        )
        .unwrap()
    }

    #[test]
    fn test_first_grid_point() {
        let proj = nbm_conus();

        let (i, j) = proj.geo_to_grid(19.228976, -126.276552);
        assert!(i.abs() < 0.01, "i should be ~0, got {}", i);
        assert!(j.abs() < 0.01, "j should be ~0, got {}", j);

        let (lat, lon) = proj.grid_to_geo(0.0, 0.0);
        assert_approx_eq!(lat, 19.228976, 1e-6);
        assert_approx_eq!(lon, -126.276552, 1e-6);
    }

    #[test]
    fn test_roundtrip_inside_grid() {
        let proj = nbm_conus();

        for (test_i, test_j) in [(1200.0, 800.0), (10.0, 1500.0), (2300.0, 20.0)] {
            let (lat, lon) = proj.grid_to_geo(test_i, test_j);
            let (i, j) = proj.geo_to_grid(lat, lon);
            assert_approx_eq!(i, test_i, 0.01);
            assert_approx_eq!(j, test_j, 0.01);
        }
    }

    #[test]
    fn test_covers_path_of_totality() {
        let proj = nbm_conus();

        // Dallas and Burlington, VT both fall inside the grid
        for (lat, lon) in [(32.777, -96.797), (44.476, -73.212)] {
            let (i, j) = proj.geo_to_grid(lat, lon);
            assert!(i > 0.0 && i < proj.nx as f64 - 1.0);
            assert!(j > 0.0 && j < proj.ny as f64 - 1.0);
        }
    }

    #[test]
    fn test_rejects_non_positive_spacing() {
        let err = LambertConformal::from_grib2(
            19.0, -126.0, -95.0, 25.0, 25.0, 0.0, 2539.703, 10, 10, 6371200.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::InvalidParameter {
                name: "dx",
                value: 0.0
            }
        );
    }
}
