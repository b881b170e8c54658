//! Map rendering for the cloud-cover forecast.
//!
//! Draws reference outlines, colored forecast samples, points of interest
//! and their labels onto a square raster and encodes it as PNG.

pub mod canvas;
pub mod colormap;
pub mod error;
pub mod map;
pub mod png;
pub mod text;
pub mod viewport;

pub use canvas::MapCanvas;
pub use colormap::{jet, Color, ValueScale};
pub use error::RenderError;
pub use map::{MapRenderer, MapScene, Overlay, RenderOptions};
pub use text::LabelFont;
pub use viewport::{PlotArea, Viewport};
