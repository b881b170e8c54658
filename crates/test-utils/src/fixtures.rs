//! Common test fixtures for the eclipse forecast pipeline.
//!
//! This module provides pre-defined data for the scenarios the resolver and
//! map renderer deal with.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Common map bounds as `(lon_min, lon_max, lat_min, lat_max)`.
pub mod bounds {
    /// Texas, where the umbra first crosses the US
    pub const TEXAS: (f64, f64, f64, f64) = (-107.0, -93.0, 25.5, 36.7);
}

/// Named points along the path of totality, as `(name, lon, lat)`.
pub const POINTS_OF_INTEREST: [(&str, f64, f64); 4] = [
    ("Dallas", -96.797, 32.777),
    ("Indianapolis", -86.158, 39.768),
    ("Cleveland", -81.694, 41.499),
    ("Burlington", -73.212, 44.476),
];

/// A render configuration file with every key set.
pub const FULL_CONFIG_JSON: &str = r#"{
    "plot_points": [
        {"name": "Dallas", "lon": -96.797, "lat": 32.777},
        {"name": "Austin", "lon": -97.743, "lat": 30.267}
    ],
    "map_bounds": {"longitude": [-107.0, -93.0], "latitude": [25.5, 36.7]},
    "filter_query": "tcc >= 0 and lat > 26"
}"#;

/// Body written for each forecast file in an [`ArchiveTree`], so downloads
/// can be checked byte for byte.
pub fn forecast_body(name: &str) -> Vec<u8> {
    format!("GRIB-fixture:{}", name).into_bytes()
}

/// Builds an on-disk archive laid out as
/// `{run-date}/{cycle-hour}/core/{filename}`.
///
/// The tree lives in a temporary directory removed on drop.
pub struct ArchiveTree {
    dir: TempDir,
}

impl ArchiveTree {
    /// Creates an empty archive root.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("blend_archive_").tempdir()?,
        })
    }

    /// Root of the archive.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Adds an empty run-date directory such as `blend.20240403`.
    pub fn run_date(self, run_date: &str) -> std::io::Result<Self> {
        fs::create_dir_all(self.root().join(run_date))?;
        Ok(self)
    }

    /// Adds a cycle directory with its `core/` subdirectory and the given
    /// forecast files.
    pub fn cycle(self, run_date: &str, hour: &str, files: &[&str]) -> std::io::Result<Self> {
        let core = self.core_dir(run_date, hour);
        fs::create_dir_all(&core)?;
        for name in files {
            fs::write(core.join(name), forecast_body(name))?;
        }
        Ok(self)
    }

    /// Path of a cycle's `core/` directory.
    pub fn core_dir(&self, run_date: &str, hour: &str) -> PathBuf {
        self.root().join(run_date).join(hour).join("core")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_tree_layout() {
        let tree = ArchiveTree::new()
            .unwrap()
            .run_date("blend.20240402")
            .unwrap()
            .cycle("blend.20240403", "02", &["blend.t02z.core.f136.co.grib2"])
            .unwrap();

        let file = tree
            .core_dir("blend.20240403", "02")
            .join("blend.t02z.core.f136.co.grib2");
        assert_eq!(
            fs::read(file).unwrap(),
            forecast_body("blend.t02z.core.f136.co.grib2")
        );
        assert!(tree.root().join("blend.20240402").is_dir());
    }
}
