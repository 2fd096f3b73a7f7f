#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry types shared across the trailmap pipeline.
//!
//! Everything downstream of the point parsers speaks in terms of these
//! types: a [`Point`] sequence goes in, [`BoundingBox`] viewports and
//! [`RoadBuckets`] of street polylines come out of the resolution stages,
//! and the composition stage turns them into render layers.

pub mod progress;
pub mod wire;

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Point {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is the `(0, 0)` "null island" coordinate that photo
    /// services report for items without a location.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// A geographic rectangle.
///
/// Derived per render request and never persisted. Once computed,
/// `south_west` is less than or equal to `north_east` in both components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude / minimum longitude corner.
    pub south_west: Point,
    /// Maximum latitude / maximum longitude corner.
    pub north_east: Point,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(south_west: Point, north_east: Point) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// The north-west corner (top-left on a north-up map).
    #[must_use]
    pub const fn north_west(&self) -> Point {
        Point::new(self.north_east.latitude, self.south_west.longitude)
    }

    /// The south-east corner (bottom-right on a north-up map).
    #[must_use]
    pub const fn south_east(&self) -> Point {
        Point::new(self.south_west.latitude, self.north_east.longitude)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&point.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&point.longitude)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
        )
    }

    /// A box with zero extent on at least one axis, e.g. one built from a
    /// single point. Must be expanded before it can back a projection.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_degenerate(&self) -> bool {
        self.south_west.latitude == self.north_east.latitude
            || self.south_west.longitude == self.north_east.longitude
    }
}

/// Road classification as reported by the street lookup service
/// (`OpenStreetMap` `highway` tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HighwayClass {
    Primary,
    Secondary,
    Tertiary,
    Residential,
    /// Any other tag (`service`, `footway`, `unclassified`, ...).
    Other(String),
}

impl HighwayClass {
    /// Parses an `OpenStreetMap` highway tag. Never fails: unknown tags map
    /// to [`HighwayClass::Other`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "tertiary" => Self::Tertiary,
            "residential" => Self::Residential,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Residential => "residential",
            Self::Other(tag) => tag,
        }
    }

    /// The bucket this class is drawn in. Depends only on the class, never
    /// on the segment geometry.
    #[must_use]
    pub const fn bucket(&self) -> RoadBucket {
        match self {
            Self::Primary | Self::Secondary => RoadBucket::Big,
            Self::Tertiary | Self::Residential => RoadBucket::Medium,
            Self::Other(_) => RoadBucket::Small,
        }
    }
}

impl From<String> for HighwayClass {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<HighwayClass> for String {
    fn from(value: HighwayClass) -> Self {
        value.as_tag().to_string()
    }
}

/// Styling bucket for street geometry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoadBucket {
    /// Primary and secondary roads.
    Big,
    /// Tertiary and residential roads.
    Medium,
    /// Everything else.
    Small,
}

/// A street segment near a lookup point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetSegment {
    pub polyline: Vec<Point>,
    pub highway: HighwayClass,
    /// Distance from the lookup point, in the service's units (km for
    /// `GeoNames`).
    pub distance: f64,
}

/// A polyline as an ordered sequence of points.
pub type Polyline = Vec<Point>;

/// A place outline. An empty outline is never handed out by the
/// resolvers; "no usable shape" is tracked in the cache instead.
pub type PlaceShape = Vec<Point>;

/// Street polylines grouped by [`RoadBucket`].
///
/// Buckets never overlap: every segment lands in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadBuckets {
    pub big: Vec<Polyline>,
    pub medium: Vec<Polyline>,
    pub small: Vec<Polyline>,
}

impl RoadBuckets {
    /// Appends a segment's polyline to the bucket of its highway class.
    pub fn push(&mut self, segment: StreetSegment) {
        self.bucket_mut(segment.highway.bucket()).push(segment.polyline);
    }

    #[must_use]
    pub fn bucket(&self, bucket: RoadBucket) -> &[Polyline] {
        match bucket {
            RoadBucket::Big => &self.big,
            RoadBucket::Medium => &self.medium,
            RoadBucket::Small => &self.small,
        }
    }

    pub fn bucket_mut(&mut self, bucket: RoadBucket) -> &mut Vec<Polyline> {
        match bucket {
            RoadBucket::Big => &mut self.big,
            RoadBucket::Medium => &mut self.medium,
            RoadBucket::Small => &mut self.small,
        }
    }

    /// Total number of polylines across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.big.len() + self.medium.len() + self.small.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that can produce a point sequence for the pipeline: track
/// files, photo feeds, check-in exports.
///
/// The core never looks inside a source format; each format is one
/// adapter implementing this trait.
pub trait PointSource {
    /// Error raised while reading or parsing the source.
    type Error;

    /// Reads every point from the source, in source order.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error if the source cannot be read or parsed.
    fn points(&self) -> Result<Vec<Point>, Self::Error>;
}

impl PointSource for [Point] {
    type Error = Infallible;

    fn points(&self) -> Result<Vec<Point>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl PointSource for Vec<Point> {
    type Error = Infallible;

    fn points(&self) -> Result<Vec<Point>, Self::Error> {
        Ok(self.clone())
    }
}
