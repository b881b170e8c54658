//! Static map layers read from GeoJSON.
//!
//! State boundaries, the eclipse centerline and the umbra path are shipped
//! as GeoJSON FeatureCollections (converted once from the source shapefiles
//! with `ogr2ogr -f GeoJSON`). Only the geometry kinds the map draws are
//! kept; anything else is skipped while loading.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::bbox::MapBounds;
use crate::error::{CommonError, CommonResult};

/// A GeoJSON position. Elevation and other trailing members are ignored.
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// Geometry of one drawable feature, as `[lon, lat]` pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerGeometry {
    Point([f64; 2]),
    /// One or more open polylines.
    Lines(Vec<Vec<[f64; 2]>>),
    /// Polygons, each a list of rings (exterior first).
    Polygons(Vec<Vec<Vec<[f64; 2]>>>),
}

impl LayerGeometry {
    /// Every polyline or ring in the geometry, for stroking.
    pub fn paths(&self) -> Vec<&[[f64; 2]]> {
        match self {
            LayerGeometry::Point(_) => Vec::new(),
            LayerGeometry::Lines(lines) => lines.iter().map(Vec::as_slice).collect(),
            LayerGeometry::Polygons(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::as_slice))
                .collect(),
        }
    }

    fn coordinates(&self) -> Box<dyn Iterator<Item = (f64, f64)> + '_> {
        match self {
            LayerGeometry::Point(p) => Box::new(std::iter::once((p[0], p[1]))),
            _ => Box::new(
                self.paths()
                    .into_iter()
                    .flat_map(|path| path.iter().map(|p| (p[0], p[1]))),
            ),
        }
    }
}

/// A feature kept after loading: its geometry and attribute table row.
#[derive(Debug, Clone)]
pub struct LayerFeature {
    pub geometry: LayerGeometry,
    pub properties: Map<String, Value>,
}

impl LayerFeature {
    /// String attribute, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// A named collection of drawable features.
#[derive(Debug, Clone)]
pub struct GeoLayer {
    pub name: String,
    pub features: Vec<LayerFeature>,
}

impl GeoLayer {
    /// Load a layer from a GeoJSON FeatureCollection file.
    pub fn from_file(name: impl Into<String>, path: &Path) -> CommonResult<Self> {
        let name = name.into();
        let content = fs::read_to_string(path).map_err(|e| CommonError::io(path, e))?;
        let layer = Self::from_geojson_str(name, &content).map_err(|e| match e {
            CommonError::Json { source, .. } => CommonError::json(path, source),
            other => other,
        })?;
        debug!(
            layer = %layer.name,
            path = %path.display(),
            features = layer.features.len(),
            "Loaded map layer"
        );
        Ok(layer)
    }

    /// Parse a layer from GeoJSON text.
    pub fn from_geojson_str(name: impl Into<String>, content: &str) -> CommonResult<Self> {
        let name = name.into();
        let collection: FeatureCollection =
            serde_json::from_str(content).map_err(|e| CommonError::json(name.as_str(), e))?;

        let mut features = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let Some(geometry) = convert_geometry(&name, geometry)? else {
                continue;
            };
            features.push(LayerFeature {
                geometry,
                properties: feature.properties.unwrap_or_default(),
            });
        }

        Ok(Self { name, features })
    }

    /// Drop features whose `key` attribute is one of `values`.
    ///
    /// Used to remove non-continental states by their postal code.
    pub fn excluding(mut self, key: &str, values: &[&str]) -> Self {
        self.features.retain(|f| match f.property_str(key) {
            Some(v) => !values.contains(&v),
            None => true,
        });
        self
    }

    /// Extent of all feature coordinates, or `None` for an empty layer.
    pub fn bounds(&self) -> Option<MapBounds> {
        MapBounds::enclosing(self.features.iter().flat_map(|f| f.geometry.coordinates()))
    }

    /// Every line and polygon ring of the layer.
    pub fn paths(&self) -> Vec<&[[f64; 2]]> {
        self.features
            .iter()
            .flat_map(|f| f.geometry.paths())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn convert_geometry(layer: &str, geometry: Geometry) -> CommonResult<Option<LayerGeometry>> {
    let converted = match geometry {
        Geometry::Point { coordinates } => Some(LayerGeometry::Point(pair(layer, &coordinates)?)),
        Geometry::LineString { coordinates } => {
            Some(LayerGeometry::Lines(vec![ring(layer, &coordinates)?]))
        }
        Geometry::MultiLineString { coordinates } => Some(LayerGeometry::Lines(
            coordinates
                .iter()
                .map(|line| ring(layer, line))
                .collect::<CommonResult<_>>()?,
        )),
        Geometry::Polygon { coordinates } => Some(LayerGeometry::Polygons(vec![coordinates
            .iter()
            .map(|r| ring(layer, r))
            .collect::<CommonResult<_>>()?])),
        Geometry::MultiPolygon { coordinates } => Some(LayerGeometry::Polygons(
            coordinates
                .iter()
                .map(|poly| {
                    poly.iter()
                        .map(|r| ring(layer, r))
                        .collect::<CommonResult<Vec<_>>>()
                })
                .collect::<CommonResult<_>>()?,
        )),
        Geometry::Unsupported => None,
    };
    Ok(converted)
}

fn ring(layer: &str, positions: &[Position]) -> CommonResult<Vec<[f64; 2]>> {
    positions.iter().map(|p| pair(layer, p)).collect()
}

fn pair(layer: &str, position: &Position) -> CommonResult<[f64; 2]> {
    match position.as_slice() {
        [lon, lat, ..] => Ok([*lon, *lat]),
        _ => Err(CommonError::InvalidGeometry {
            layer: layer.to_string(),
            message: format!("position needs at least 2 members, got {}", position.len()),
        }),
    }
}
