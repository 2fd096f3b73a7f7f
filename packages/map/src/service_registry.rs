//! Compile-time registry of remote service endpoints.
//!
//! Each service is defined in a TOML file under `services/`, embedded at
//! compile time and exposed via [`all_services`] and [`service`].

use serde::Deserialize;

/// A remote service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Unique identifier (`"geonames"`, `"flickr"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// `GeoNames` web services.
    #[serde(rename = "geonames")]
    GeoNames {
        /// API base URL (e.g., `"http://api.geonames.org"`).
        base_url: String,
    },
    /// Flickr REST API.
    Flickr {
        /// REST endpoint (e.g., `"https://api.flickr.com/services/rest/"`).
        base_url: String,
    },
}

const fn default_timeout() -> u64 {
    30
}

impl ServiceConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::GeoNames { base_url } | ProviderConfig::Flickr { base_url } => base_url,
        }
    }
}

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("geonames", include_str!("../services/geonames.toml")),
    ("flickr", include_str!("../services/flickr.toml")),
];

/// Returns every service configuration.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ServiceConfig> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse service '{name}': {e}"))
        })
        .collect()
}

/// Looks up one service by id.
#[must_use]
pub fn service(id: &str) -> Option<ServiceConfig> {
    all_services().into_iter().find(|s| s.id == id)
}
