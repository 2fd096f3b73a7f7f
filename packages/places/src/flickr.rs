//! Flickr places client.
//!
//! Reverse geocoding goes through `flickr.places.findByLatLon`, outlines
//! through `flickr.places.getInfo`. Both are called with
//! `format=json&nojsoncallback=1`.
//!
//! See <https://www.flickr.com/services/api/flickr.places.findByLatLon.html>

use async_trait::async_trait;
use serde::Deserialize;
use trailmap_geo_models::Point;
use trailmap_geo_models::wire::{NumberOrText, OneOrMany};

use crate::{LookupOutcome, PlaceError, PlaceRef, PlaceService};

/// Client for the Flickr REST endpoint.
#[derive(Debug, Clone)]
pub struct FlickrPlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FlickrPlacesClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, PlaceError> {
        let mut query = vec![
            ("method", method.to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        log::debug!("{} {method} {params:?}", self.base_url);

        let resp = self.client.get(&self.base_url).query(&query).send().await?;

        if !resp.status().is_success() {
            return Err(PlaceError::Status(resp.status().as_u16()));
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| PlaceError::Parse {
            message: format!("{method}: {e}"),
        })
    }
}

#[async_trait]
impl PlaceService for FlickrPlacesClient {
    async fn find_by_lat_lon(&self, point: Point) -> LookupOutcome<PlaceRef> {
        let params = [
            ("lat", point.latitude.to_string()),
            ("lon", point.longitude.to_string()),
        ];
        match self.call::<FindResponse>("flickr.places.findByLatLon", &params).await {
            Ok(resp) => resp.into_outcome(),
            Err(e) => LookupOutcome::Transient(e),
        }
    }

    async fn shape_for(&self, place: &PlaceRef) -> LookupOutcome<Vec<String>> {
        let params = [("woe_id", place.woeid.clone())];
        match self.call::<InfoResponse>("flickr.places.getInfo", &params).await {
            Ok(resp) => resp.into_outcome(),
            Err(e) => LookupOutcome::Transient(e),
        }
    }
}

/// Flickr numbers errors shared by every method from 100; method-specific
/// errors sit below.
const API_ERROR_CODES: u32 = 100;

#[derive(Debug, Deserialize)]
struct FindResponse {
    stat: String,
    #[serde(default)]
    code: Option<NumberOrText>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    places: Option<Places>,
}

#[derive(Debug, Deserialize)]
struct Places {
    #[serde(default)]
    place: Vec<PlaceRecord>,
    #[serde(default)]
    total: Option<NumberOrText>,
}

#[derive(Debug, Deserialize)]
struct PlaceRecord {
    woeid: NumberOrText,
    place_type_id: NumberOrText,
}

impl FindResponse {
    /// A failed find is a definitive answer for this location, as is an
    /// empty result set. API-wide failures (codes from 100 up, such as a bad
    /// key or the service being down) say nothing about the location and
    /// are transient.
    fn into_outcome(self) -> LookupOutcome<PlaceRef> {
        if self.stat != "ok" {
            let message = self.message.unwrap_or_else(|| "no message".to_string());
            let code = self.code.as_ref().and_then(NumberOrText::as_u32);

            if let Some(code) = code.filter(|code| *code >= API_ERROR_CODES) {
                log::warn!("findByLatLon unavailable (code {code}): {message}");
                return LookupOutcome::Transient(PlaceError::Service { message });
            }

            log::warn!("findByLatLon failed: {message}");
            return LookupOutcome::Empty;
        }

        let Some(places) = self.places else {
            return LookupOutcome::Empty;
        };

        if places
            .total
            .as_ref()
            .and_then(NumberOrText::as_u32)
            .is_some_and(|total| total == 0)
        {
            return LookupOutcome::Empty;
        }

        let Some(record) = places.place.into_iter().next() else {
            return LookupOutcome::Empty;
        };

        let Some(place_type_id) = record.place_type_id.as_u32() else {
            return LookupOutcome::Transient(PlaceError::Parse {
                message: format!("bad place_type_id {:?}", record.place_type_id),
            });
        };

        LookupOutcome::Found(PlaceRef {
            woeid: record.woeid.to_text(),
            place_type_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    stat: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    place: Option<InfoPlace>,
}

#[derive(Debug, Deserialize)]
struct InfoPlace {
    #[serde(default)]
    shapedata: Option<ShapeData>,
}

#[derive(Debug, Deserialize)]
struct ShapeData {
    #[serde(default)]
    polylines: Option<Polylines>,
}

#[derive(Debug, Deserialize)]
struct Polylines {
    #[serde(default)]
    polyline: OneOrMany<PolylineContent>,
}

#[derive(Debug, Deserialize)]
struct PolylineContent {
    #[serde(rename = "_content")]
    content: String,
}

impl InfoResponse {
    fn into_outcome(self) -> LookupOutcome<Vec<String>> {
        if self.stat != "ok" {
            return LookupOutcome::Transient(PlaceError::Service {
                message: self.message.unwrap_or_else(|| "getInfo failed".to_string()),
            });
        }

        let polylines: Vec<String> = self
            .place
            .and_then(|place| place.shapedata)
            .and_then(|shape| shape.polylines)
            .map(|lines| {
                lines
                    .polyline
                    .into_vec()
                    .into_iter()
                    .map(|line| line.content)
                    .filter(|content| !content.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if polylines.is_empty() {
            LookupOutcome::Empty
        } else {
            LookupOutcome::Found(polylines)
        }
    }
}
