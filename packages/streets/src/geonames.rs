//! `GeoNames` nearby-streets client.
//!
//! Uses the `findNearbyStreetsOSMJSON` endpoint, which returns
//! `OpenStreetMap` street segments near a coordinate together with their
//! distance (km) and `highway` tag.
//!
//! See <https://www.geonames.org/export/web-services.html#findNearbyStreetsOSM>

use async_trait::async_trait;
use trailmap_geo_models::Point;

use crate::{StreetError, StreetService};

/// Client for a `GeoNames` web service instance.
///
/// Request timeouts come from the [`reqwest::Client`] handed in.
#[derive(Debug, Clone)]
pub struct GeoNamesClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
}

impl GeoNamesClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, username: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
        }
    }
}

#[async_trait]
impl StreetService for GeoNamesClient {
    async fn nearby_streets(&self, point: Point) -> Result<serde_json::Value, StreetError> {
        let url = format!("{}/findNearbyStreetsOSMJSON", self.base_url);

        let mut query = vec![
            ("lat", point.latitude.to_string()),
            ("lng", point.longitude.to_string()),
        ];
        if let Some(username) = &self.username {
            query.push(("username", username.clone()));
        }

        log::debug!("{url}?lat={}&lng={}", point.latitude, point.longitude);

        let resp = self.client.get(&url).query(&query).send().await?;

        if !resp.status().is_success() {
            return Err(StreetError::Status(resp.status().as_u16()));
        }

        let body: serde_json::Value = resp.json().await?;
        check_status(&body)?;
        Ok(body)
    }
}

/// `GeoNames` reports failures (bad credentials, exhausted credits) as a
/// 200 response carrying a `status` object instead of results.
fn check_status(body: &serde_json::Value) -> Result<(), StreetError> {
    let Some(status) = body.get("status") else {
        return Ok(());
    };

    let message = status
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    Err(StreetError::Service { message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_object_is_an_error() {
        let body = serde_json::json!({
            "status": {"message": "user account not enabled to use the free webservice", "value": 10}
        });
        let err = check_status(&body).unwrap_err();
        assert!(matches!(err, StreetError::Service { ref message } if message.contains("not enabled")));
    }

    #[test]
    fn results_pass_status_check() {
        let body = serde_json::json!({"streetSegment": []});
        assert!(check_status(&body).is_ok());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = GeoNamesClient::new(reqwest::Client::new(), "http://api.geonames.org/", None);
        assert_eq!(client.base_url, "http://api.geonames.org");
    }
}
