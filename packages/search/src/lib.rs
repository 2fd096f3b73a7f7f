#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geotagged photo search.
//!
//! [`paginate`] walks a [`PhotoSearch`] result set page by page under a
//! hard result cap, and [`plan_windows`] splits a date range into
//! contiguous upload-date windows so that each window stays under that
//! cap.

pub mod flickr;
pub mod paginate;
pub mod windows;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trailmap_geo_models::Point;

pub use paginate::{DEFAULT_PER_PAGE, MAX_RESULTS, paginate};
pub use windows::{DEFAULT_DAYS_OFFSET, TimeWindow, plan_windows};

/// Errors from photo searches.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("Search service returned status {0}")]
    Status(u16),

    /// The service reported a failure in the response body.
    #[error("Search service error: {message}")]
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

/// Photo search filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free text match on title, description and tags.
    pub text: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    /// Restrict to one user's photos.
    pub user_id: Option<String>,
    /// Restrict to a place.
    pub woe_id: Option<String>,
    /// With `user_id`, include the user's contacts (`all` or `ff`).
    pub contacts: Option<String>,
    /// Inclusive lower bound on upload time, Unix seconds.
    pub min_upload_date: Option<i64>,
    /// Inclusive upper bound on upload time, Unix seconds.
    pub max_upload_date: Option<i64>,
}

impl SearchQuery {
    /// Photos `user_id` took in the place `woe_id`. `contacts` widens the
    /// search to the user's contacts (`all`) or friends and family (`ff`).
    #[must_use]
    pub fn user_photos(user_id: &str, woe_id: &str, contacts: Option<String>) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            woe_id: Some(woe_id.to_string()),
            contacts,
            ..Self::default()
        }
    }

    /// The same query restricted to photos uploaded within `window`.
    #[must_use]
    pub fn within(&self, window: &TimeWindow) -> Self {
        Self {
            min_upload_date: Some(window.start.timestamp()),
            max_upload_date: Some(window.end.timestamp()),
            ..self.clone()
        }
    }

    /// Query parameters for the set fields.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let text_fields = [
            ("text", &self.text),
            ("tags", &self.tags),
            ("user_id", &self.user_id),
            ("woe_id", &self.woe_id),
            ("contacts", &self.contacts),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value {
                params.push((name, value.clone()));
            }
        }
        if let Some(min) = self.min_upload_date {
            params.push(("min_upload_date", min.to_string()));
        }
        if let Some(max) = self.max_upload_date {
            params.push(("max_upload_date", max.to_string()));
        }
        params
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Total number of pages the service reports for the query.
    pub pages: u32,
    /// Photo locations on this page, in result order.
    pub points: Vec<Point>,
}

/// A remote search producing geotagged points.
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// Fetches one page (1-based) of results.
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn params_skip_unset_fields() {
        let query = SearchQuery {
            tags: Some("walk".to_string()),
            user_id: Some("35034348999@N01".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![
                ("tags", "walk".to_string()),
                ("user_id", "35034348999@N01".to_string())
            ]
        );
    }

    #[test]
    fn within_sets_upload_bounds() {
        let window = TimeWindow {
            start: Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2009, 1, 7, 23, 59, 59).unwrap(),
        };
        let query = SearchQuery::default().within(&window);
        assert_eq!(query.min_upload_date, Some(1_230_768_000));
        assert_eq!(query.max_upload_date, Some(1_231_372_799));
    }

    #[test]
    fn user_photos_sends_user_place_and_contacts() {
        let query = SearchQuery::user_photos("35034348999@N01", "2487956", Some("all".to_string()));
        assert_eq!(
            query.params(),
            vec![
                ("user_id", "35034348999@N01".to_string()),
                ("woe_id", "2487956".to_string()),
                ("contacts", "all".to_string())
            ]
        );
    }
}
