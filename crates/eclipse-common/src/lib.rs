//! Common types and utilities shared by the resolver and map-renderer services.

pub mod bbox;
pub mod error;
pub mod geojson;
pub mod metadata;
pub mod sample;
pub mod time;

pub use bbox::MapBounds;
pub use error::{CommonError, CommonResult};
pub use geojson::{GeoLayer, LayerGeometry};
pub use metadata::ForecastMetadata;
pub use sample::{PointOfInterest, WeatherSample};
pub use time::{eclipse_datetime, format_cycle_dt, parse_utc_time, ECLIPSE_DATETIME};
