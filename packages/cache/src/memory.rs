//! Process-lifetime cache backend.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::{CacheBackend, CacheError, CachePayload, SpatialKey};

/// In-memory backend. Entries live as long as the instance.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<SpatialKey, CachePayload>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &SpatialKey) -> Result<Option<CachePayload>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &SpatialKey, payload: &CachePayload) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.clone(), payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_data_and_empty() {
        let cache = MemoryCache::new();
        let a = SpatialKey::from_raw("a");
        let b = SpatialKey::from_raw("b");
        let data = CachePayload::Data(serde_json::json!({"streetSegment": []}));

        cache.put(&a, &data).unwrap();
        cache.put(&b, &CachePayload::Empty).unwrap();

        assert_eq!(cache.get(&a).unwrap(), Some(data));
        assert_eq!(cache.get(&b).unwrap(), Some(CachePayload::Empty));
        assert_eq!(cache.get(&SpatialKey::from_raw("c")).unwrap(), None);
    }

    #[test]
    fn last_write_wins() {
        let cache = MemoryCache::new();
        let key = SpatialKey::from_raw("k");
        cache.put(&key, &CachePayload::Empty).unwrap();
        cache
            .put(&key, &CachePayload::Data(serde_json::json!(1)))
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&key).unwrap(),
            Some(CachePayload::Data(serde_json::json!(1)))
        );
    }
}
