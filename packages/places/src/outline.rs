//! Outline text parsing.

use trailmap_geo_models::{PlaceShape, Point};

use crate::PlaceError;

/// Parses an outline: space-separated `lat,lon` pairs.
///
/// # Errors
///
/// Returns [`PlaceError::Parse`] if a pair does not hold exactly two
/// numbers.
pub fn parse_outline(content: &str) -> Result<PlaceShape, PlaceError> {
    content
        .split_whitespace()
        .map(|pair| {
            let Some((lat, lon)) = pair.split_once(',') else {
                return Err(PlaceError::Parse {
                    message: format!("malformed outline pair {pair:?}"),
                });
            };

            let parse = |text: &str| {
                text.trim().parse::<f64>().map_err(|e| PlaceError::Parse {
                    message: format!("bad coordinate {text:?} in pair {pair:?}: {e}"),
                })
            };

            Ok(Point::new(parse(lat)?, parse(lon)?))
        })
        .collect()
}
