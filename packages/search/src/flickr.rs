//! Flickr photo search.
//!
//! See <https://www.flickr.com/services/api/flickr.photos.search.html>

use async_trait::async_trait;
use serde::Deserialize;
use trailmap_geo_models::Point;
use trailmap_geo_models::wire::{NumberOrText, OneOrMany};

use crate::{PhotoSearch, SearchError, SearchPage, SearchQuery};

/// `flickr.photos.search` client, asking for geo extras.
#[derive(Debug, Clone)]
pub struct FlickrPhotoSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FlickrPhotoSearch {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl PhotoSearch for FlickrPhotoSearch {
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError> {
        let mut params = vec![
            ("method", "flickr.photos.search".to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
            ("extras", "geo".to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        params.extend(query.params());

        log::debug!("flickr.photos.search page {page} {:?}", query.params());

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }

        let text = resp.text().await?;
        parse_search(&text)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    stat: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    photos: Option<Photos>,
}

#[derive(Debug, Deserialize)]
struct Photos {
    pages: NumberOrText,
    #[serde(default)]
    photo: OneOrMany<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    latitude: Option<NumberOrText>,
    #[serde(default)]
    longitude: Option<NumberOrText>,
}

fn parse_search(text: &str) -> Result<SearchPage, SearchError> {
    let resp: SearchResponse = serde_json::from_str(text).map_err(|e| SearchError::Parse {
        message: format!("flickr.photos.search: {e}"),
    })?;

    if resp.stat != "ok" {
        return Err(SearchError::Service {
            message: resp.message.unwrap_or_else(|| "search failed".to_string()),
        });
    }

    let Some(photos) = resp.photos else {
        return Err(SearchError::Parse {
            message: "response has no photos".to_string(),
        });
    };

    let pages = photos.pages.as_u32().ok_or_else(|| SearchError::Parse {
        message: format!("bad page count {:?}", photos.pages),
    })?;

    let points = photos
        .photo
        .into_vec()
        .into_iter()
        .filter_map(|photo| {
            let latitude = photo.latitude?.as_f64()?;
            let longitude = photo.longitude?.as_f64()?;
            Some(Point::new(latitude, longitude))
        })
        .collect();

    Ok(SearchPage { pages, points })
}
