//! Render configuration record.
//!
//! An operator-supplied JSON object with three optional keys:
//!
//! ```json
//! {
//!     "plot_points": [{"name": "Dallas", "lon": -96.797, "lat": 32.777}],
//!     "map_bounds": {"longitude": [-107.0, -93.0], "latitude": [25.5, 36.7]},
//!     "filter_query": "tcc >= 0 and lat > 26"
//! }
//! ```
//!
//! A missing or unparseable file yields the defaults (no points, no
//! bounds, no query). Keys that are present but malformed are fatal.

use std::path::Path;

use eclipse_common::{MapBounds, PointOfInterest};
use region::Query;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Default location of the configuration record.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub plot_points: Vec<PointOfInterest>,
    /// `None` means no restriction: the map fits the data
    pub map_bounds: Option<MapBounds>,
    pub filter_query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct PlotPoint {
    name: String,
    lon: f64,
    lat: f64,
}

impl RenderConfig {
    /// Load the record at `path`, falling back to defaults when it cannot
    /// be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        match read_document(path).await {
            Ok(document) => {
                let config = Self::from_document(&document)?;
                info!(
                    path = %path.display(),
                    points = config.plot_points.len(),
                    bounded = config.map_bounds.is_some(),
                    query = config.filter_query.as_ref().map(|q| q.source()),
                    "Loaded render config"
                );
                Ok(config)
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Unable to load config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse configuration text.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let document = parse_document(Path::new("<inline>"), content)?;
        Self::from_document(&document)
    }

    fn from_document(document: &Map<String, Value>) -> Result<Self, ConfigError> {
        let plot_points = parse_points(document.get("plot_points"))?;
        if plot_points.is_empty() {
            debug!("Did not find points to plot");
        }

        Ok(Self {
            plot_points,
            map_bounds: parse_bounds(document.get("map_bounds"))?,
            filter_query: parse_query(document.get("filter_query"))?,
        })
    }
}

async fn read_document(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    parse_document(path, &content)
}

fn parse_document(path: &Path, content: &str) -> Result<Map<String, Value>, ConfigError> {
    let load_error = |reason: String| ConfigError::Load {
        path: path.to_path_buf(),
        reason,
    };
    match serde_json::from_str(content).map_err(|e| load_error(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(load_error(format!(
            "expected a JSON object, found {}",
            kind(&other)
        ))),
    }
}

fn parse_points(value: Option<&Value>) -> Result<Vec<PointOfInterest>, ConfigError> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ConfigError::InvalidPoints(format!(
                "expected a list, found {}",
                kind(other)
            )))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let point = PlotPoint::deserialize(entry)
                .map_err(|e| ConfigError::InvalidPoints(format!("entry {}: {}", i, e)))?;
            Ok(PointOfInterest::new(point.name, point.lon, point.lat))
        })
        .collect()
}

/// `{"longitude": [min, max], "latitude": [min, max]}` with `min < max`,
/// or unset when the key is absent or empty-like (`null`, `{}`, `[]`,
/// `""`, `0`, `false`).
fn parse_bounds(value: Option<&Value>) -> Result<Option<MapBounds>, ConfigError> {
    let map = match value {
        None => return Ok(None),
        Some(v) if is_unset(v) => return Ok(None),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ConfigError::BoundsConfig(format!(
                "expected an object, found {}",
                kind(other)
            )))
        }
    };

    let (lon_min, lon_max) = range(map, "longitude")?;
    let (lat_min, lat_max) = range(map, "latitude")?;
    Ok(Some(MapBounds::new(lon_min, lon_max, lat_min, lat_max)))
}

/// Empty or zero-like values leave an optional key unset.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn range(map: &Map<String, Value>, key: &str) -> Result<(f64, f64), ConfigError> {
    let invalid = |reason: String| ConfigError::BoundsConfig(format!("{}: {}", key, reason));

    let items = match map.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => return Err(invalid(format!("expected a list, found {}", kind(other)))),
        None => return Err(invalid("missing".to_string())),
    };
    let [min, max] = items.as_slice() else {
        return Err(invalid(format!("expected 2 values, found {}", items.len())));
    };
    let (Some(min), Some(max)) = (min.as_f64(), max.as_f64()) else {
        return Err(invalid("values must be numbers".to_string()));
    };
    if min >= max {
        return Err(invalid(format!("minimum {} is not below maximum {}", min, max)));
    }
    Ok((min, max))
}

fn parse_query(value: Option<&Value>) -> Result<Option<Query>, ConfigError> {
    match value {
        None => Ok(None),
        Some(v) if is_unset(v) => Ok(None),
        Some(Value::String(s)) => Ok(Some(Query::parse(s)?)),
        Some(other) => Err(ConfigError::InvalidQuery(format!(
            "expected a string, found {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::FULL_CONFIG_JSON;

    #[test]
    fn test_full_config() {
        let config = RenderConfig::from_json_str(FULL_CONFIG_JSON).unwrap();
        assert_eq!(config.plot_points.len(), 2);
        assert_eq!(config.plot_points[0].name, "Dallas");
        assert_eq!(config.plot_points[1].lat, 30.267);
        assert_eq!(
            config.map_bounds,
            Some(MapBounds::new(-107.0, -93.0, 25.5, 36.7))
        );
        assert_eq!(
            config.filter_query.unwrap().source(),
            "tcc >= 0 and lat > 26"
        );
    }

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert!(config.plot_points.is_empty());
        assert!(config.map_bounds.is_none());
        assert!(config.filter_query.is_none());
    }

    #[test]
    fn test_unset_values() {
        let config = RenderConfig::from_json_str(
            r#"{"plot_points": null, "map_bounds": {}, "filter_query": ""}"#,
        )
        .unwrap();
        assert!(config.plot_points.is_empty());
        assert!(config.map_bounds.is_none());
        assert!(config.filter_query.is_none());
    }

    #[test]
    fn test_empty_like_bounds_are_unset() {
        for bounds in ["null", "{}", "[]", r#""""#, "0", "false"] {
            let json = format!(r#"{{"map_bounds": {}, "filter_query": []}}"#, bounds);
            let config = RenderConfig::from_json_str(&json).unwrap();
            assert!(config.map_bounds.is_none(), "{} should leave bounds unset", bounds);
            assert!(config.filter_query.is_none());
        }

        for bounds in ["true", "1", r#""bounds""#] {
            let json = format!(r#"{{"map_bounds": {}}}"#, bounds);
            assert!(matches!(
                RenderConfig::from_json_str(&json),
                Err(ConfigError::BoundsConfig(_))
            ));
        }
    }

    #[test]
    fn test_malformed_bounds_are_fatal() {
        for bounds in [
            r#"{"longitude": [-107.0, -93.0]}"#,
            r#"{"longitude": [-107.0], "latitude": [25.5, 36.7]}"#,
            r#"{"longitude": [-107.0, "x"], "latitude": [25.5, 36.7]}"#,
            r#"{"longitude": [-93.0, -107.0], "latitude": [25.5, 36.7]}"#,
            r#"{"longitude": "-107,-93", "latitude": [25.5, 36.7]}"#,
            r#"[-107.0, -93.0, 25.5, 36.7]"#,
        ] {
            let json = format!(r#"{{"map_bounds": {}}}"#, bounds);
            let err = RenderConfig::from_json_str(&json).unwrap_err();
            assert!(
                matches!(err, ConfigError::BoundsConfig(_)),
                "{} gave {:?}",
                bounds,
                err
            );
            assert!(!err.is_recoverable());
        }
    }

    #[test]
    fn test_malformed_points_are_fatal() {
        let err = RenderConfig::from_json_str(r#"{"plot_points": [{"name": "Dallas", "lon": -96.8}]}"#)
            .unwrap_err();
        match err {
            ConfigError::InvalidPoints(msg) => assert!(msg.starts_with("entry 0")),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = RenderConfig::from_json_str(r#"{"plot_points": {"name": "Dallas"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPoints(_)));
    }

    #[test]
    fn test_bad_query_is_fatal() {
        let err = RenderConfig::from_json_str(r#"{"filter_query": "lat >"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Query(_)));

        let err = RenderConfig::from_json_str(r#"{"filter_query": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidQuery(_)));
    }

    #[test]
    fn test_non_object_document_is_recoverable() {
        let err = RenderConfig::from_json_str("[1, 2]").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::load(&dir.path().join("config.json"))
            .await
            .unwrap();
        assert!(config.plot_points.is_empty());
        assert!(config.map_bounds.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = RenderConfig::load(&path).await.unwrap();
        assert!(config.filter_query.is_none());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, FULL_CONFIG_JSON).unwrap();

        let config = RenderConfig::load(&path).await.unwrap();
        assert_eq!(config.plot_points.len(), 2);
    }
}
