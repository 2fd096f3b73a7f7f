#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place outlines around a point set.
//!
//! Each point is reverse geocoded to a place, and the place's outline is
//! fetched. Both remote steps go through a [`PlaceService`] and report a
//! three-valued [`LookupOutcome`] so that the [`PlaceShapeResolver`] can
//! tell a confirmed "nothing here" (cached, never asked again) from a
//! transient failure (skipped, retried on the next run).

pub mod flickr;
pub mod outline;
pub mod resolver;

use async_trait::async_trait;
use thiserror::Error;
use trailmap_geo_models::Point;

pub use resolver::{PlaceShapeResolver, PlaceShapes};

/// Errors from place lookups.
#[derive(Debug, Error)]
pub enum PlaceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("Place service returned status {0}")]
    Status(u16),

    /// The service reported a failure in the response body.
    #[error("Place service error: {message}")]
    Service {
        /// Message reported by the service.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Result of one remote resolution step.
#[derive(Debug)]
pub enum LookupOutcome<T> {
    /// The step produced a value.
    Found(T),
    /// The service confirmed there is no usable result. Safe to cache.
    Empty,
    /// The step failed in a way that may succeed later. Never cached.
    Transient(PlaceError),
}

/// A reverse-geocoded place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRef {
    /// Where-on-earth identifier.
    pub woeid: String,
    /// Numeric place type (7 = town, 8 = state, 9 = county, 12 = country,
    /// 22 = neighbourhood).
    pub place_type_id: u32,
}

/// Remote reverse geocoding and place outline lookup.
#[async_trait]
pub trait PlaceService: Send + Sync {
    /// Finds the place containing `point`.
    async fn find_by_lat_lon(&self, point: Point) -> LookupOutcome<PlaceRef>;

    /// Fetches the raw outline polylines of `place`: one string of
    /// space-separated `lat,lon` pairs per polyline.
    async fn shape_for(&self, place: &PlaceRef) -> LookupOutcome<Vec<String>>;
}
