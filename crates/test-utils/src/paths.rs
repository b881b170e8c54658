//! Path utilities for locating test data files.
//!
//! Real forecast files and converted reference layers are not checked in;
//! these helpers find them when they have been fetched locally.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// This function checks the following locations in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/grib2-parser/testdata/`
/// 3. `testdata/` at the workspace root
/// 4. `data/forecast/`, where the resolver writes its download
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/grib2-parser/testdata").join(name),
        root.join("testdata").join(name),
        root.join("data/forecast").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(find_test_file("definitely-not-here.grib2").is_none());
    }
}
