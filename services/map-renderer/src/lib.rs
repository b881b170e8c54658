//! Map renderer.
//!
//! Reads the forecast downloaded by the resolver, restricts it to the
//! configured region, joins cloud cover onto the points of interest and
//! saves the annotated map.

pub mod config;
pub mod error;
pub mod layers;
pub mod pipeline;

pub use config::{RenderConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, MapError};
pub use layers::{continental, LayerPaths, ReferenceLayers, NON_CONTINENTAL};
pub use pipeline::{output_path, render_map, run, MapJob, MapSummary, RenderedMap, MAP_TITLE};
