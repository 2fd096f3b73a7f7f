//! Spatial cache keys.
//!
//! A key is the H3 cell containing a point at a fixed resolution. Points
//! in the same cell share a key on purpose: a hit means "reuse the lookup
//! done for a nearby point".

use std::collections::BTreeSet;
use std::fmt;

use h3o::{LatLng, Resolution};
use trailmap_geo_models::Point;

use crate::CacheError;

/// Key granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrecision {
    /// Street lookups: H3 resolution 15 (~0.9 m² cells).
    Street,
    /// Place lookups: H3 resolution 8 (~0.74 km² cells).
    Place,
}

impl KeyPrecision {
    #[must_use]
    pub const fn resolution(self) -> Resolution {
        match self {
            Self::Street => Resolution::Fifteen,
            Self::Place => Resolution::Eight,
        }
    }
}

/// Cache key derived from a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpatialKey(String);

impl SpatialKey {
    /// Derives the key of the cell containing `point`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCoordinate`] if the coordinate is not a
    /// finite latitude/longitude.
    pub fn for_point(point: Point, precision: KeyPrecision) -> Result<Self, CacheError> {
        let coord = LatLng::new(point.latitude, point.longitude).map_err(|e| {
            CacheError::InvalidCoordinate {
                latitude: point.latitude,
                longitude: point.longitude,
                message: e.to_string(),
            }
        })?;

        let key = coord.to_cell(precision.resolution()).to_string();
        log::debug!(
            "spatial key ({precision:?}) for {}, {}: {key}",
            point.latitude,
            point.longitude
        );
        Ok(Self(key))
    }

    /// Wraps an already-computed key.
    #[must_use]
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Appends a place-type filter so lookups made under different filters
    /// never share an entry. The filter is rendered in sorted order.
    #[must_use]
    pub fn salted_with_place_types(&self, place_types: &BTreeSet<u32>) -> Self {
        let salt = place_types
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("{}#{salt}", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_same_key() {
        let p = Point::new(40.7128, -74.0060);
        assert_eq!(
            SpatialKey::for_point(p, KeyPrecision::Street).unwrap(),
            SpatialKey::for_point(p, KeyPrecision::Street).unwrap()
        );
    }

    #[test]
    fn coarse_keys_are_shared_by_nearby_points() {
        let a = Point::new(40.712_80, -74.006_00);
        let b = Point::new(40.712_81, -74.006_01);
        assert_eq!(
            SpatialKey::for_point(a, KeyPrecision::Place).unwrap(),
            SpatialKey::for_point(b, KeyPrecision::Place).unwrap()
        );
    }

    #[test]
    fn fine_keys_separate_points_a_block_apart() {
        let a = Point::new(40.7128, -74.0060);
        let b = Point::new(40.7138, -74.0070);
        assert_ne!(
            SpatialKey::for_point(a, KeyPrecision::Street).unwrap(),
            SpatialKey::for_point(b, KeyPrecision::Street).unwrap()
        );
    }

    #[test]
    fn precisions_never_collide() {
        let p = Point::new(48.8566, 2.3522);
        assert_ne!(
            SpatialKey::for_point(p, KeyPrecision::Street).unwrap(),
            SpatialKey::for_point(p, KeyPrecision::Place).unwrap()
        );
    }

    #[test]
    fn distinct_place_type_filters_get_distinct_keys() {
        let key = SpatialKey::for_point(Point::new(51.5, -0.12), KeyPrecision::Place).unwrap();
        let towns: BTreeSet<u32> = [7].into_iter().collect();
        let towns_and_counties: BTreeSet<u32> = [7, 9].into_iter().collect();

        let a = key.salted_with_place_types(&towns);
        let b = key.salted_with_place_types(&towns_and_counties);
        assert_ne!(a, b);
        assert_ne!(a, key);
        assert!(b.as_str().ends_with("#7,9"));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let err = SpatialKey::for_point(Point::new(f64::NAN, 0.0), KeyPrecision::Street);
        assert!(matches!(err, Err(CacheError::InvalidCoordinate { .. })));
    }
}
