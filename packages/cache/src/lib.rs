#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatially keyed cache for remote geodata lookups.
//!
//! Street and place lookups are keyed by a [`SpatialKey`], an H3 cell
//! covering the lookup point, so nearby points share one remote call.
//! A [`GeoCache`] wraps one [`CacheBackend`]:
//!
//! - [`MemoryCache`] lives for the process and is the default.
//! - [`DuckDbCache`] persists entries in a `DuckDB` table per dataset.
//!
//! Caching is an optimization. [`GeoCache`] never surfaces backend
//! failures: unreadable entries are treated as misses and failed writes
//! are logged and dropped.

pub mod duckdb_cache;
pub mod key;
pub mod memory;
pub mod paths;

use std::path::Path;

use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use duckdb_cache::DuckDbCache;
pub use key::{KeyPrecision, SpatialKey};
pub use memory::MemoryCache;

/// Errors raised by cache backends.
///
/// These stay inside this crate's public backend API; [`GeoCache`] logs
/// them and degrades instead of propagating.
#[derive(Debug, Error)]
pub enum CacheError {
    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Stored payload could not be decoded.
    #[error("Payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O error (creating the cache directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The coordinate cannot be mapped to a spatial key.
    #[error("Invalid coordinate ({latitude}, {longitude}): {message}")]
    InvalidCoordinate {
        /// Latitude of the rejected point.
        latitude: f64,
        /// Longitude of the rejected point.
        longitude: f64,
        /// Why the coordinate was rejected.
        message: String,
    },
}

/// Which lookup results a cache instance holds.
///
/// Each dataset gets its own cache instance and its own table, so street
/// and place entries can never be read back through the wrong cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CacheDataset {
    /// Nearby street responses.
    Streets,
    /// Reverse-geocoded place outlines.
    PlaceShapes,
}

impl CacheDataset {
    /// Table name used by persistent backends.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Streets => "street_segments",
            Self::PlaceShapes => "place_shapes",
        }
    }
}

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachePayload {
    /// The decoded response (or derived data) for this key.
    Data(serde_json::Value),
    /// The lookup was performed and confirmed to have no usable result.
    Empty,
}

impl CachePayload {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the data, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Empty => None,
        }
    }
}

/// Storage behind a [`GeoCache`].
///
/// Implementations must give identical semantics: exact-match lookup,
/// and a second `put` for the same key replaces the first (no merge).
pub trait CacheBackend: Send + Sync {
    /// Short backend name for log lines.
    fn name(&self) -> &'static str;

    /// Looks up `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be read or the stored
    /// payload cannot be decoded.
    fn get(&self, key: &SpatialKey) -> Result<Option<CachePayload>, CacheError>;

    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the write fails.
    fn put(&self, key: &SpatialKey, payload: &CachePayload) -> Result<(), CacheError>;
}

/// Fetch/store front end over one [`CacheBackend`] for one dataset.
pub struct GeoCache {
    dataset: CacheDataset,
    backend: Box<dyn CacheBackend>,
}

impl std::fmt::Debug for GeoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoCache")
            .field("dataset", &self.dataset)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl GeoCache {
    #[must_use]
    pub fn new(dataset: CacheDataset, backend: Box<dyn CacheBackend>) -> Self {
        Self { dataset, backend }
    }

    /// A process-lifetime cache.
    #[must_use]
    pub fn in_memory(dataset: CacheDataset) -> Self {
        Self::new(dataset, Box::new(MemoryCache::new()))
    }

    /// Opens (or creates) a persistent cache at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the database cannot be opened or the table
    /// cannot be created.
    pub fn persistent(dataset: CacheDataset, path: &Path) -> Result<Self, CacheError> {
        Ok(Self::new(dataset, Box::new(DuckDbCache::open(path, dataset)?)))
    }

    /// Opens a persistent cache when `path` is given, otherwise an
    /// in-memory one. A persistent cache that fails to open is logged and
    /// replaced by an in-memory cache.
    #[must_use]
    pub fn open_or_memory(dataset: CacheDataset, path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::debug!("No {dataset} cache database configured, caching in memory");
            return Self::in_memory(dataset);
        };

        match Self::persistent(dataset, path) {
            Ok(cache) => {
                log::info!("Using {dataset} cache at {}", path.display());
                cache
            }
            Err(e) => {
                log::error!(
                    "Failed to open {dataset} cache at {}: {e}; caching in memory",
                    path.display()
                );
                Self::in_memory(dataset)
            }
        }
    }

    #[must_use]
    pub const fn dataset(&self) -> CacheDataset {
        self.dataset
    }

    /// Returns the cached payload for `key`, or `None` on a miss.
    ///
    /// Backend errors and undecodable entries are logged and reported as a
    /// miss.
    #[must_use]
    pub fn fetch(&self, key: &SpatialKey) -> Option<CachePayload> {
        match self.backend.get(key) {
            Ok(Some(payload)) => {
                log::debug!("{} cache hit for key {key}", self.dataset);
                Some(payload)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!(
                    "Failed to load {} cache data for {key} from {}: {e}",
                    self.dataset,
                    self.backend.name()
                );
                None
            }
        }
    }

    /// Stores `payload` under `key`. Returns `false` if the write failed;
    /// failures are logged and never raised.
    pub fn store(&self, key: &SpatialKey, payload: &CachePayload) -> bool {
        match self.backend.put(key, payload) {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Failed to store {} cache data for {key} in {}: {e}",
                    self.dataset,
                    self.backend.name()
                );
                false
            }
        }
    }
}
