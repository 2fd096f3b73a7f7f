#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Viewport derivation for point sets.
//!
//! [`compute_bounding_box`] finds the extent of a point set and [`expand`]
//! pads it by a geodesic margin measured with [`distance`] (spherical law
//! of cosines, nautical miles). The padding uses the local length of a
//! degree of longitude at each edge rather than a fixed number of degrees,
//! so high-latitude boxes are not over-padded.
//!
//! Boxes never wrap the antimeridian: expanded corners are clamped to
//! `[-90, 90]` latitude and `[-180, 180]` longitude.

use geo::{BoundingRect, MultiPoint};
use thiserror::Error;
use trailmap_geo_models::{BoundingBox, Point};

/// Nautical miles per degree of great-circle arc.
pub const NAUTICAL_MILES_PER_DEGREE: f64 = 60.0;

/// Errors from viewport derivation.
#[derive(Debug, Error)]
pub enum ViewportError {
    /// A viewport was requested for zero points.
    #[error("Cannot compute a bounding box for an empty point set")]
    EmptyInput,

    /// The expansion margin was negative or not a finite number.
    #[error("Invalid expansion margin: {0}")]
    InvalidMargin(f64),
}

/// Computes the smallest box containing every point.
///
/// A single point (or several identical points) yields a zero-area box,
/// which must be expanded before it can back a projection.
///
/// # Errors
///
/// Returns [`ViewportError::EmptyInput`] if `points` is empty.
pub fn compute_bounding_box(points: &[Point]) -> Result<BoundingBox, ViewportError> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| geo::Point::new(p.longitude, p.latitude))
        .collect();

    let rect = multi.bounding_rect().ok_or(ViewportError::EmptyInput)?;

    Ok(BoundingBox::new(
        Point::new(rect.min().y, rect.min().x),
        Point::new(rect.max().y, rect.max().x),
    ))
}

/// Great-circle distance between two coordinates in nautical miles, using
/// the spherical law of cosines.
///
/// Less precise than haversine for very short distances, which is fine for
/// viewport margins. Symmetric, and zero for identical points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let theta = (a.longitude - b.longitude).to_radians();

    let cos_arc = lat1
        .sin()
        .mul_add(lat2.sin(), lat1.cos() * lat2.cos() * theta.cos());

    // Rounding can push identical points just past 1.0.
    cos_arc.clamp(-1.0, 1.0).acos().to_degrees() * NAUTICAL_MILES_PER_DEGREE
}

/// Grows `bbox` outward by roughly `margin` nautical miles on each side.
///
/// The south-west corner is padded using the length of one degree of
/// longitude along the south edge, the north-east corner using the length
/// along the north edge. The same degree delta is applied to latitude and
/// longitude of a corner. An edge with no measurable degree length (a box
/// edge sitting on a pole) is left in place.
///
/// # Errors
///
/// Returns [`ViewportError::InvalidMargin`] if `margin` is negative or not
/// finite.
pub fn expand(bbox: &BoundingBox, margin: f64) -> Result<BoundingBox, ViewportError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(ViewportError::InvalidMargin(margin));
    }

    let sw = bbox.south_west;
    let ne = bbox.north_east;

    let delta_sw = degree_delta(sw, margin);
    let delta_ne = degree_delta(ne, margin);

    log::debug!("Expanding viewport by {margin} nm: sw delta {delta_sw}°, ne delta {delta_ne}°");

    Ok(BoundingBox::new(
        clamp_point(Point::new(sw.latitude - delta_sw, sw.longitude - delta_sw)),
        clamp_point(Point::new(ne.latitude + delta_ne, ne.longitude + delta_ne)),
    ))
}

/// Converts `margin` into degrees using the length of one degree of
/// longitude at `corner`'s latitude. The one-degree step goes toward the
/// sign of the corner's longitude.
#[allow(clippy::float_cmp)]
fn degree_delta(corner: Point, margin: f64) -> f64 {
    if margin == 0.0 {
        return 0.0;
    }

    let step = if corner.longitude < 0.0 { -1.0 } else { 1.0 };
    let one_degree = distance(corner, Point::new(corner.latitude, corner.longitude + step));

    if one_degree.is_finite() && one_degree > 0.0 {
        margin / one_degree
    } else {
        log::warn!(
            "No measurable longitude scale at latitude {}, leaving edge unexpanded",
            corner.latitude
        );
        0.0
    }
}

fn clamp_point(point: Point) -> Point {
    Point::new(
        point.latitude.clamp(-90.0, 90.0),
        point.longitude.clamp(-180.0, 180.0),
    )
}
