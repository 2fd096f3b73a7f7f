//! Cache-or-fetch place outline resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use trailmap_cache::{CachePayload, GeoCache, KeyPrecision, SpatialKey};
use trailmap_geo_models::progress::{ProgressCallback, null_progress};
use trailmap_geo_models::{PlaceShape, Point};

use crate::outline::parse_outline;
use crate::{LookupOutcome, PlaceService};

/// Outlines found for a point set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceShapes {
    /// One entry per outline, in discovery order.
    pub shapes: Vec<PlaceShape>,
    /// Every outline vertex, flattened. Used to pin the viewport.
    pub points: Vec<Point>,
}

impl PlaceShapes {
    fn extend(&mut self, shapes: Vec<PlaceShape>) {
        for shape in shapes {
            self.points.extend_from_slice(&shape);
            self.shapes.push(shape);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Resolves the outline of the place containing each point.
///
/// Lookups run one point at a time so a negative answer recorded for a
/// cell is seen by the next point in the same cell.
pub struct PlaceShapeResolver {
    service: Arc<dyn PlaceService>,
    cache: Arc<GeoCache>,
    progress: Arc<dyn ProgressCallback>,
}

impl PlaceShapeResolver {
    #[must_use]
    pub fn new(service: Arc<dyn PlaceService>, cache: Arc<GeoCache>) -> Self {
        Self {
            service,
            cache,
            progress: null_progress(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Resolves outlines for every point.
    ///
    /// With `valid_place_types`, only places of those types contribute; an
    /// empty set behaves like no filter. Points for which nothing usable
    /// exists are remembered in the cache and never looked up again.
    pub async fn resolve(
        &self,
        points: &[Point],
        valid_place_types: Option<&BTreeSet<u32>>,
    ) -> PlaceShapes {
        let filter = valid_place_types.filter(|types| !types.is_empty());

        self.progress.begin("Resolving place outlines", points.len() as u64);

        let mut result = PlaceShapes::default();
        for point in points {
            if let Some(shapes) = self.shapes_for(*point, filter).await {
                result.extend(shapes);
            }
            self.progress.point_done();
        }

        log::info!(
            "Resolved {} place outlines ({} vertices) for {} points",
            result.shapes.len(),
            result.points.len(),
            points.len()
        );
        self.progress
            .finish(format!("Resolved {} place outlines", result.shapes.len()));

        result
    }

    async fn shapes_for(
        &self,
        point: Point,
        filter: Option<&BTreeSet<u32>>,
    ) -> Option<Vec<PlaceShape>> {
        let key = match SpatialKey::for_point(point, KeyPrecision::Place) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Skipping place lookup: {e}");
                return None;
            }
        };
        let key = match filter {
            Some(types) => key.salted_with_place_types(types),
            None => key,
        };

        match self.cache.fetch(&key) {
            Some(CachePayload::Data(value)) => {
                match serde_json::from_value::<Vec<PlaceShape>>(value) {
                    Ok(shapes) => return Some(shapes),
                    Err(e) => log::warn!("Ignoring undecodable place shapes for {key}: {e}"),
                }
            }
            Some(CachePayload::Empty) => {
                log::debug!("No place shape for {key} (cached)");
                return None;
            }
            None => {}
        }

        let place = match self.service.find_by_lat_lon(point).await {
            LookupOutcome::Found(place) => place,
            LookupOutcome::Empty => {
                log::debug!("No place at {}, {}", point.latitude, point.longitude);
                self.cache.store(&key, &CachePayload::Empty);
                return None;
            }
            LookupOutcome::Transient(e) => {
                log::error!(
                    "Failed to find place at {}, {}: {e}",
                    point.latitude,
                    point.longitude
                );
                return None;
            }
        };

        if filter.is_some_and(|types| !types.contains(&place.place_type_id)) {
            log::debug!(
                "Place {} has type {}, not in filter",
                place.woeid,
                place.place_type_id
            );
            self.cache.store(&key, &CachePayload::Empty);
            return None;
        }

        let polylines = match self.service.shape_for(&place).await {
            LookupOutcome::Found(polylines) => polylines,
            LookupOutcome::Empty => {
                log::debug!("Place {} has no shape data", place.woeid);
                self.cache.store(&key, &CachePayload::Empty);
                return None;
            }
            LookupOutcome::Transient(e) => {
                log::error!("Failed to fetch shape of place {}: {e}", place.woeid);
                return None;
            }
        };

        let shapes: Vec<PlaceShape> = polylines
            .iter()
            .filter_map(|content| match parse_outline(content) {
                Ok(shape) if !shape.is_empty() => Some(shape),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Dropping outline of place {}: {e}", place.woeid);
                    None
                }
            })
            .collect();

        if shapes.is_empty() {
            self.cache.store(&key, &CachePayload::Empty);
            return None;
        }

        match serde_json::to_value(&shapes) {
            Ok(value) => {
                self.cache.store(&key, &CachePayload::Data(value));
            }
            Err(e) => log::warn!("Not caching place shapes for {key}: {e}"),
        }

        Some(shapes)
    }
}
