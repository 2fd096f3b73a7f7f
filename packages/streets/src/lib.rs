#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street geometry near a point set.
//!
//! For every input point the [`StreetResolver`] looks up nearby street
//! segments (cache first, then the [`StreetService`]), drops segments
//! farther than a maximum distance and sorts the rest into
//! [`RoadBuckets`](trailmap_geo_models::RoadBuckets) by highway class.
//!
//! Street data is a best-effort enrichment: a failed lookup costs one
//! point's streets, never the whole resolution.

pub mod geonames;
pub mod resolver;
pub mod response;

use async_trait::async_trait;
use thiserror::Error;
use trailmap_geo_models::Point;

pub use resolver::StreetResolver;

/// Errors from street lookups.
#[derive(Debug, Error)]
pub enum StreetError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("Street service returned status {0}")]
    Status(u16),

    /// The service reported an error in the response body.
    #[error("Street service error: {message}")]
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

/// Remote lookup of street segments near a coordinate.
#[async_trait]
pub trait StreetService: Send + Sync {
    /// Returns the decoded response for streets near `point`.
    ///
    /// The response is cached as-is, so implementations return the whole
    /// body rather than a filtered view of it.
    ///
    /// # Errors
    ///
    /// Returns [`StreetError`] on network failure, a non-success status, or
    /// a body that is not JSON.
    async fn nearby_streets(&self, point: Point) -> Result<serde_json::Value, StreetError>;
}
