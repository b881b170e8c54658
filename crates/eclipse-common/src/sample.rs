//! Point types flowing through the filter/join pipeline.

use serde::{Deserialize, Serialize};

/// One geolocated total-cloud-cover value from the forecast grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub lat: f64,
    pub lon: f64,
    /// Total cloud cover in percent
    pub tcc: f32,
}

impl WeatherSample {
    pub fn new(lat: f64, lon: f64, tcc: f32) -> Self {
        Self { lat, lon, tcc }
    }
}

/// A named location from the operator's configuration.
///
/// `nearest_tcc` is filled in by the nearest join and stays `None` when no
/// samples were available to join against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_tcc: Option<f32>,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            name: name.into(),
            lon,
            lat,
            nearest_tcc: None,
        }
    }

    /// Annotation text used on the rendered map.
    pub fn label(&self) -> String {
        match self.nearest_tcc {
            Some(tcc) => format!("{} ({:.0}%)", self.name, tcc),
            None => format!("{} (n/a)", self.name),
        }
    }
}
