//! Static reference layers drawn under and over the forecast.

use std::path::{Path, PathBuf};

use eclipse_common::GeoLayer;
use tracing::info;

use crate::error::MapError;

/// Postal codes of states and territories left off the continental map.
pub const NON_CONTINENTAL: [&str; 7] = ["HI", "VI", "MP", "GU", "AK", "AS", "PR"];

/// Attribute holding the postal code in the Census state boundaries.
pub const STATE_CODE_KEY: &str = "STUSPS";

/// Where the layer files live.
#[derive(Debug, Clone)]
pub struct LayerPaths {
    pub base_map: PathBuf,
    pub centerline: PathBuf,
    pub umbra: PathBuf,
}

impl Default for LayerPaths {
    fn default() -> Self {
        Self {
            base_map: PathBuf::from("data/base_maps/tl_2023_us_state.geojson"),
            centerline: PathBuf::from("data/eclipse_path/center.geojson"),
            umbra: PathBuf::from("data/eclipse_path/upath_hi.geojson"),
        }
    }
}

/// State boundaries plus the eclipse geometry.
#[derive(Debug, Clone)]
pub struct ReferenceLayers {
    /// Continental states only
    pub states: GeoLayer,
    pub centerline: GeoLayer,
    pub umbra: GeoLayer,
}

impl ReferenceLayers {
    pub fn load(paths: &LayerPaths) -> Result<Self, MapError> {
        let states = load_layer("base map", &paths.base_map)?;
        let total = states.features.len();
        let states = continental(states);
        info!(
            kept = states.features.len(),
            dropped = total - states.features.len(),
            "Loaded base map"
        );

        Ok(Self {
            states,
            centerline: load_layer("eclipse centerline", &paths.centerline)?,
            umbra: load_layer("umbra path", &paths.umbra)?,
        })
    }
}

/// Drop the non-continental states and territories.
pub fn continental(states: GeoLayer) -> GeoLayer {
    states.excluding(STATE_CODE_KEY, &NON_CONTINENTAL)
}

fn load_layer(what: &'static str, path: &Path) -> Result<GeoLayer, MapError> {
    GeoLayer::from_file(what, path).map_err(|e| MapError::input(what, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str, lon: f64) -> String {
        format!(
            r#"{{"type": "Feature", "properties": {{"STUSPS": "{}"}},
                "geometry": {{"type": "Polygon", "coordinates": [[[{lon}, 30], [{lon2}, 30], [{lon2}, 31], [{lon}, 30]]]}}}}"#,
            code,
            lon = lon,
            lon2 = lon + 1.0
        )
    }

    #[test]
    fn test_continental_drops_territories() {
        let features: Vec<String> = ["TX", "AK", "PR", "OK", "GU"]
            .iter()
            .enumerate()
            .map(|(i, code)| state(code, -100.0 + i as f64))
            .collect();
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            features.join(",")
        );
        let layer = GeoLayer::from_geojson_str("states", &json).unwrap();

        let kept = continental(layer);
        let codes: Vec<&str> = kept
            .features
            .iter()
            .filter_map(|f| f.property_str(STATE_CODE_KEY))
            .collect();
        assert_eq!(codes, vec!["TX", "OK"]);
    }

    #[test]
    fn test_missing_layer_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LayerPaths {
            base_map: dir.path().join("states.geojson"),
            centerline: dir.path().join("center.geojson"),
            umbra: dir.path().join("umbra.geojson"),
        };
        match ReferenceLayers::load(&paths) {
            Err(MapError::Input { what, .. }) => assert_eq!(what, "base map"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
