//! Map bounds: the rectangular viewport used for filtering and plot extent.

use serde::{Deserialize, Serialize};

/// A lon/lat rectangle in degrees.
///
/// The field order follows the configuration record
/// (`longitude: [min, max]`, `latitude: [min, max]`), not the usual
/// `minx, miny, maxx, maxy` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl MapBounds {
    /// Create bounds from the two coordinate ranges.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Smallest bounds enclosing every `(lon, lat)` in the iterator.
    ///
    /// Returns `None` for an empty iterator or one holding only non-finite
    /// coordinates.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bounds: Option<MapBounds> = None;
        for (lon, lat) in points {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => MapBounds::new(lon, lon, lat, lat),
                Some(b) => b.including(lon, lat),
            });
        }
        bounds
    }

    /// Grow the bounds so they include the given point.
    pub fn including(&self, lon: f64, lat: f64) -> Self {
        Self {
            lon_min: self.lon_min.min(lon),
            lon_max: self.lon_max.max(lon),
            lat_min: self.lat_min.min(lat),
            lat_max: self.lat_max.max(lat),
        }
    }

    /// Smallest bounds enclosing both rectangles.
    pub fn union(&self, other: &MapBounds) -> Self {
        Self {
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
        }
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Strict containment after shrinking every edge inward by `buffer`.
    ///
    /// Points lying exactly on a (shrunk) edge are outside.
    pub fn contains_strict(&self, lon: f64, lat: f64, buffer: f64) -> bool {
        self.lon_min + buffer < lon
            && lon < self.lon_max - buffer
            && self.lat_min + buffer < lat
            && lat < self.lat_max - buffer
    }

    /// Expand each side by a fraction of the span, keeping degenerate
    /// (zero-width) bounds drawable.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad_x = if self.width() > 0.0 {
            self.width() * fraction
        } else {
            0.5
        };
        let pad_y = if self.height() > 0.0 {
            self.height() * fraction
        } else {
            0.5
        };
        Self {
            lon_min: self.lon_min - pad_x,
            lon_max: self.lon_max + pad_x,
            lat_min: self.lat_min - pad_y,
            lat_max: self.lat_max + pad_y,
        }
    }
}
