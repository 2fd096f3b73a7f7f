//! Remote services and caches shared by map sessions.

use std::sync::Arc;
use std::time::Duration;

use trailmap_cache::{CacheDataset, GeoCache};
use trailmap_geo_models::progress::{ProgressCallback, null_progress};
use trailmap_places::PlaceService;
use trailmap_places::flickr::FlickrPlacesClient;
use trailmap_search::flickr::FlickrPhotoSearch;
use trailmap_streets::StreetService;
use trailmap_streets::geonames::GeoNamesClient;

use crate::service_registry::{self, ServiceConfig};
use crate::{FLICKR_API_KEY_ENV, GEONAMES_USERNAME_ENV, MapConfig, MapError};

/// Everything a [`crate::MapSession`] looks things up with.
///
/// Cloning is cheap; clones share the same clients and caches.
#[derive(Clone)]
pub struct MapServices {
    pub streets: Arc<dyn StreetService>,
    /// `None` when place outlines are unavailable.
    pub places: Option<Arc<dyn PlaceService>>,
    pub street_cache: Arc<GeoCache>,
    pub place_cache: Arc<GeoCache>,
    pub progress: Arc<dyn ProgressCallback>,
}

impl MapServices {
    /// Services with process-lifetime caches.
    #[must_use]
    pub fn new(streets: Arc<dyn StreetService>, places: Option<Arc<dyn PlaceService>>) -> Self {
        Self {
            streets,
            places,
            street_cache: Arc::new(GeoCache::in_memory(CacheDataset::Streets)),
            place_cache: Arc::new(GeoCache::in_memory(CacheDataset::PlaceShapes)),
            progress: null_progress(),
        }
    }

    #[must_use]
    pub fn with_caches(mut self, street_cache: Arc<GeoCache>, place_cache: Arc<GeoCache>) -> Self {
        self.street_cache = street_cache;
        self.place_cache = place_cache;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Builds the `GeoNames` and Flickr clients from the service registry
    /// and credentials in the environment, and opens the configured
    /// caches.
    ///
    /// Without a Flickr API key, place outlines are disabled.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if a service is missing from the registry or an
    /// HTTP client cannot be built.
    pub fn from_env(config: &MapConfig) -> Result<Self, MapError> {
        let geonames = registry_entry("geonames")?;
        let username = std::env::var(GEONAMES_USERNAME_ENV).ok();
        if username.is_none() {
            log::warn!("{GEONAMES_USERNAME_ENV} is not set; street lookups will be anonymous");
        }
        let streets = GeoNamesClient::new(http_client(&geonames)?, geonames.base_url(), username);

        let places: Option<Arc<dyn PlaceService>> = match std::env::var(FLICKR_API_KEY_ENV) {
            Ok(api_key) => {
                let flickr = registry_entry("flickr")?;
                Some(Arc::new(FlickrPlacesClient::new(
                    http_client(&flickr)?,
                    flickr.base_url(),
                    api_key,
                )))
            }
            Err(_) => {
                if config.draw_place_outlines {
                    log::warn!("{FLICKR_API_KEY_ENV} is not set; place outlines disabled");
                }
                None
            }
        };

        let street_cache = GeoCache::open_or_memory(
            CacheDataset::Streets,
            config.cache.db_path(CacheDataset::Streets).as_deref(),
        );
        let place_cache = GeoCache::open_or_memory(
            CacheDataset::PlaceShapes,
            config.cache.db_path(CacheDataset::PlaceShapes).as_deref(),
        );

        Ok(Self::new(Arc::new(streets), places)
            .with_caches(Arc::new(street_cache), Arc::new(place_cache)))
    }
}

/// Builds the Flickr photo search client.
///
/// # Errors
///
/// Returns [`MapError::MissingCredential`] if no Flickr API key is set.
pub fn flickr_photo_search() -> Result<FlickrPhotoSearch, MapError> {
    let api_key = std::env::var(FLICKR_API_KEY_ENV)
        .map_err(|_| MapError::MissingCredential(FLICKR_API_KEY_ENV))?;
    let flickr = registry_entry("flickr")?;
    Ok(FlickrPhotoSearch::new(
        http_client(&flickr)?,
        flickr.base_url(),
        api_key,
    ))
}

fn registry_entry(id: &str) -> Result<ServiceConfig, MapError> {
    service_registry::service(id).ok_or_else(|| MapError::UnknownService(id.to_string()))
}

fn http_client(service: &ServiceConfig) -> Result<reqwest::Client, MapError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(service.timeout_secs))
        .build()?)
}
