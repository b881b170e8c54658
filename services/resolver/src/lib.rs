//! Forecast resolver.
//!
//! Locates the newest National Blend of Models cycle in a remote archive,
//! picks the forecast file closest to the eclipse and downloads it together
//! with a metadata record for the map renderer.

pub mod archive;
pub mod download;
pub mod error;
pub mod resolve;

pub use archive::{Archive, HttpArchive, LocalArchive, DEFAULT_ARCHIVE_URL};
pub use error::ResolveError;
pub use resolve::{
    cycle_identifier_to_timestamp, desired_lead_hours, generate_candidates, resolve_latest_cycle,
    run, select_available, Cycle, ForecastCandidate, RunConfig, RunSummary,
};
