//! Cache-or-fetch street resolution for a point set.

use std::sync::Arc;

use futures::StreamExt as _;
use trailmap_cache::{CachePayload, GeoCache, KeyPrecision, SpatialKey};
use trailmap_geo_models::progress::{ProgressCallback, null_progress};
use trailmap_geo_models::{Point, RoadBuckets, StreetSegment};

use crate::StreetService;
use crate::response::segments_within;

/// Resolves nearby street geometry for each point and buckets it by road
/// class.
pub struct StreetResolver {
    service: Arc<dyn StreetService>,
    cache: Arc<GeoCache>,
    concurrency: usize,
    progress: Arc<dyn ProgressCallback>,
}

impl StreetResolver {
    /// Creates a resolver that looks points up one at a time.
    #[must_use]
    pub fn new(service: Arc<dyn StreetService>, cache: Arc<GeoCache>) -> Self {
        Self {
            service,
            cache,
            concurrency: 1,
            progress: null_progress(),
        }
    }

    /// Number of point lookups allowed in flight at once. Output order does
    /// not depend on this.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Resolves streets near every point.
    ///
    /// Segments farther than `max_distance` from their lookup point are
    /// dropped. A segment near several points is kept once per point, so
    /// well-travelled streets are drawn more often.
    pub async fn resolve(&self, points: &[Point], max_distance: f64) -> RoadBuckets {
        self.progress.begin("Resolving streets", points.len() as u64);

        let per_point: Vec<Vec<StreetSegment>> = futures::stream::iter(points.iter().copied())
            .map(|point| self.segments_near(point, max_distance))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut buckets = RoadBuckets::default();
        for segment in per_point.into_iter().flatten() {
            buckets.push(segment);
        }

        log::info!(
            "Resolved {} street polylines for {} points ({} big, {} medium, {} small)",
            buckets.len(),
            points.len(),
            buckets.big.len(),
            buckets.medium.len(),
            buckets.small.len()
        );
        self.progress
            .finish(format!("Resolved {} street polylines", buckets.len()));

        buckets
    }

    async fn segments_near(&self, point: Point, max_distance: f64) -> Vec<StreetSegment> {
        let response = self.response_for(point).await;
        self.progress.point_done();

        let Some(body) = response else {
            return Vec::new();
        };

        match segments_within(&body, max_distance) {
            Ok(segments) => segments,
            Err(e) => {
                log::warn!(
                    "No street segments for {}, {}: {e}",
                    point.latitude,
                    point.longitude
                );
                Vec::new()
            }
        }
    }

    /// Returns the cached response for the point's cell, fetching and
    /// caching it on a miss.
    async fn response_for(&self, point: Point) -> Option<serde_json::Value> {
        let key = match SpatialKey::for_point(point, KeyPrecision::Street) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Skipping street lookup: {e}");
                return None;
            }
        };

        match self.cache.fetch(&key) {
            Some(CachePayload::Data(body)) => return Some(body),
            Some(CachePayload::Empty) => {
                log::debug!("Streets for {key} cached as empty");
                return None;
            }
            None => {}
        }

        match self.service.nearby_streets(point).await {
            Ok(body) => {
                self.cache.store(&key, &CachePayload::Data(body.clone()));
                Some(body)
            }
            Err(e) => {
                log::error!(
                    "Failed to fetch streets near {}, {}: {e}",
                    point.latitude,
                    point.longitude
                );
                None
            }
        }
    }
}
