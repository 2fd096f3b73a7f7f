//! Persistent cache backend stored in `DuckDB`.
//!
//! One table per [`CacheDataset`]. Payloads are stored as JSON text; the
//! "confirmed empty" sentinel is stored as `NULL` so it can never be
//! confused with a real payload.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use duckdb::{Connection, OptionalExt as _};

use crate::{CacheBackend, CacheDataset, CacheError, CachePayload, SpatialKey};

/// `DuckDB` backend for one dataset.
///
/// The connection sits behind a mutex, so writes through one instance are
/// serialized.
pub struct DuckDbCache {
    conn: Mutex<Connection>,
    dataset: CacheDataset,
}

impl std::fmt::Debug for DuckDbCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbCache")
            .field("dataset", &self.dataset)
            .finish_non_exhaustive()
    }
}

impl DuckDbCache {
    /// Opens (or creates) the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the directory, connection or table cannot
    /// be created.
    pub fn open(path: &Path, dataset: CacheDataset) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn, dataset)
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the connection or table cannot be created.
    pub fn open_in_memory(dataset: CacheDataset) -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?, dataset)
    }

    /// Uses an existing connection, e.g. a `try_clone()` of a connection
    /// that already holds the other dataset's table.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the table cannot be created.
    pub fn from_connection(conn: Connection, dataset: CacheDataset) -> Result<Self, CacheError> {
        create_schema(&conn, dataset)?;
        Ok(Self {
            conn: Mutex::new(conn),
            dataset,
        })
    }
}

fn create_schema(conn: &Connection, dataset: CacheDataset) -> Result<(), CacheError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            spatial_key TEXT NOT NULL PRIMARY KEY,
            payload TEXT,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        );",
        table = dataset.table_name(),
    ))?;
    Ok(())
}

impl CacheBackend for DuckDbCache {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn get(&self, key: &SpatialKey) -> Result<Option<CachePayload>, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let row: Option<Option<String>> = conn
            .query_row(
                &format!(
                    "SELECT payload FROM {} WHERE spatial_key = ? LIMIT 1",
                    self.dataset.table_name()
                ),
                duckdb::params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(None) => Ok(Some(CachePayload::Empty)),
            Some(Some(text)) => Ok(Some(CachePayload::Data(serde_json::from_str(&text)?))),
        }
    }

    fn put(&self, key: &SpatialKey, payload: &CachePayload) -> Result<(), CacheError> {
        let text = match payload {
            CachePayload::Data(value) => Some(serde_json::to_string(value)?),
            CachePayload::Empty => None,
        };

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            &format!(
                "INSERT INTO {} (spatial_key, payload) VALUES (?, ?)
                 ON CONFLICT (spatial_key) DO UPDATE SET payload = EXCLUDED.payload",
                self.dataset.table_name()
            ),
            duckdb::params![key.as_str(), text.as_deref()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoCache;

    fn key(raw: &str) -> SpatialKey {
        SpatialKey::from_raw(raw)
    }

    #[test]
    fn round_trips_data_and_empty() {
        let cache = DuckDbCache::open_in_memory(CacheDataset::Streets).unwrap();
        let data = CachePayload::Data(serde_json::json!({
            "streetSegment": {"highway": "residential", "distance": "0.02", "line": "10 10,10.01 10.01"}
        }));

        cache.put(&key("street"), &data).unwrap();
        cache.put(&key("nothing"), &CachePayload::Empty).unwrap();

        assert_eq!(cache.get(&key("street")).unwrap(), Some(data));
        assert_eq!(cache.get(&key("nothing")).unwrap(), Some(CachePayload::Empty));
        assert_eq!(cache.get(&key("missing")).unwrap(), None);
    }

    #[test]
    fn second_store_replaces_first() {
        let cache = DuckDbCache::open_in_memory(CacheDataset::PlaceShapes).unwrap();
        let first = CachePayload::Data(serde_json::json!([1]));
        let second = CachePayload::Data(serde_json::json!([2]));

        cache.put(&key("k"), &first).unwrap();
        cache.put(&key("k"), &second).unwrap();

        assert_eq!(cache.get(&key("k")).unwrap(), Some(second));
    }

    #[test]
    fn corrupt_payload_reads_as_miss() {
        let backend = DuckDbCache::open_in_memory(CacheDataset::Streets).unwrap();
        {
            let conn = backend.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO street_segments (spatial_key, payload) VALUES (?, ?)",
                duckdb::params!["bad", "{not json"],
            )
            .unwrap();
        }

        assert!(matches!(
            backend.get(&key("bad")),
            Err(CacheError::Decode(_))
        ));

        let cache = GeoCache::new(CacheDataset::Streets, Box::new(backend));
        assert!(cache.fetch(&key("bad")).is_none());
    }

    #[test]
    fn datasets_sharing_a_database_stay_separate() {
        let conn = Connection::open_in_memory().unwrap();
        let streets =
            DuckDbCache::from_connection(conn.try_clone().unwrap(), CacheDataset::Streets).unwrap();
        let places = DuckDbCache::from_connection(conn, CacheDataset::PlaceShapes).unwrap();

        streets
            .put(&key("shared"), &CachePayload::Data(serde_json::json!("road")))
            .unwrap();

        assert_eq!(places.get(&key("shared")).unwrap(), None);
        assert!(streets.get(&key("shared")).unwrap().is_some());
    }

    #[test]
    fn survives_reopen() {
        let dir = std::env::temp_dir().join(format!("trailmap_cache_reopen_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("shapes.duckdb");
        let data = CachePayload::Data(serde_json::json!([[{"latitude": 1.0, "longitude": 2.0}]]));

        {
            let cache = DuckDbCache::open(&path, CacheDataset::PlaceShapes).unwrap();
            cache.put(&key("persisted"), &data).unwrap();
        }

        let cache = DuckDbCache::open(&path, CacheDataset::PlaceShapes).unwrap();
        assert_eq!(cache.get(&key("persisted")).unwrap(), Some(data));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
