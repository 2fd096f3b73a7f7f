#![allow(clippy::module_name_repetitions)]
//! Default locations for the persistent cache databases.
//!
//! Paths live under the data directory: `$TRAILMAP_DATA_DIR` when set,
//! `./data` otherwise.

use std::path::{Path, PathBuf};

use crate::CacheDataset;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TRAILMAP_DATA_DIR";

/// Returns the data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| PathBuf::from("data"), PathBuf::from)
}

/// Returns the `cache/` directory holding the cache databases.
#[must_use]
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Returns the default database path for a dataset.
#[must_use]
pub fn cache_db_path(dataset: CacheDataset) -> PathBuf {
    cache_dir().join(format!("{}.duckdb", dataset.table_name()))
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_dataset_paths_differ() {
        let streets = cache_db_path(CacheDataset::Streets);
        let places = cache_db_path(CacheDataset::PlaceShapes);
        assert_ne!(streets, places);
        assert!(streets.ends_with("cache/street_segments.duckdb"));
    }

    #[test]
    fn ensure_dir_accepts_empty_parent() {
        ensure_dir(Path::new("")).unwrap();
    }
}
