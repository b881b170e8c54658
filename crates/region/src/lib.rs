//! Region filter and join over the forecast point cloud.
//!
//! Samples are restricted to the map viewport, optionally narrowed by a
//! query expression such as `tcc > 50 and lat < 35`, and finally joined onto
//! the configured points of interest by nearest neighbour.

pub mod bounds;
pub mod error;
pub mod join;
pub mod pipeline;
pub mod query;

pub use bounds::filter_by_bounds;
pub use error::QueryError;
pub use join::{nearest_join, nearest_join_with, LinearScan, NearestSearch};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use query::{filter_by_query, Query};
