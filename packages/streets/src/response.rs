//! Decoding of nearby-street responses.
//!
//! The service returns `{"streetSegment": ...}` where the value is a single
//! segment object when there is one match and an array otherwise.
//! [`OneOrMany`] normalizes both shapes to a sequence at the
//! deserialization boundary. Distances arrive as strings.

use serde::Deserialize;
use trailmap_geo_models::wire::{NumberOrText, OneOrMany};
use trailmap_geo_models::{HighwayClass, Point, Polyline, StreetSegment};

use crate::StreetError;

#[derive(Debug, Deserialize)]
struct StreetResponse {
    #[serde(rename = "streetSegment")]
    street_segment: Option<OneOrMany<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SegmentRecord {
    highway: String,
    distance: NumberOrText,
    line: String,
}

/// Extracts the segments within `max_distance` from a response body.
///
/// Individual records that are missing a field or carry an unparseable
/// line are logged and skipped.
///
/// # Errors
///
/// Returns [`StreetError::Parse`] if the body has no `streetSegment` field.
pub fn segments_within(
    body: &serde_json::Value,
    max_distance: f64,
) -> Result<Vec<StreetSegment>, StreetError> {
    let response = StreetResponse::deserialize(body).map_err(|e| StreetError::Parse {
        message: format!("unexpected street response shape: {e}"),
    })?;

    let records = response
        .street_segment
        .ok_or_else(|| StreetError::Parse {
            message: "response has no streetSegment field".to_string(),
        })?
        .into_vec();

    let mut segments = Vec::with_capacity(records.len());

    for value in records {
        let record = match SegmentRecord::deserialize(&value) {
            Ok(record) => record,
            Err(e) => {
                log::error!("Skipping street segment without highway/distance/line: {e}");
                continue;
            }
        };

        let Some(distance) = record.distance.as_f64() else {
            log::error!("Skipping street segment with distance {:?}", record.distance);
            continue;
        };

        log::debug!("segment: {}, {distance}", record.highway);

        if distance > max_distance {
            log::debug!("skip segment at {distance} (max {max_distance})");
            continue;
        }

        let polyline = match parse_line(&record.line) {
            Ok(polyline) => polyline,
            Err(e) => {
                log::error!("Skipping street segment: {e}");
                continue;
            }
        };

        segments.push(StreetSegment {
            polyline,
            highway: HighwayClass::from_tag(&record.highway),
            distance,
        });
    }

    Ok(segments)
}

/// Parses a street line: comma-separated coordinate pairs, each pair
/// written as `lon lat`.
///
/// # Errors
///
/// Returns [`StreetError::Parse`] if a pair does not hold exactly two
/// numbers.
pub fn parse_line(line: &str) -> Result<Polyline, StreetError> {
    line.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.split_whitespace();
            let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(StreetError::Parse {
                    message: format!("malformed coordinate pair {pair:?}"),
                });
            };

            let parse = |text: &str| {
                text.parse::<f64>().map_err(|e| StreetError::Parse {
                    message: format!("bad coordinate {text:?} in pair {pair:?}: {e}"),
                })
            };

            Ok(Point::new(parse(lat)?, parse(lon)?))
        })
        .collect()
}
