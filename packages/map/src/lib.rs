#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map rendering sessions.
//!
//! A [`MapSession`] ties the resolvers and the composition pipeline
//! together for one render: optional place outlines pin the viewport,
//! nearby streets are resolved per point, and the layers are composed
//! onto a canvas. [`PhotoMap`] maps everything one photo search returns;
//! [`WindowedSearchDriver`] runs one session per upload window instead.

pub mod config;
pub mod photos;
pub mod service_registry;
pub mod services;
pub mod session;
pub mod windowed;

use thiserror::Error;
use trailmap_compose::ComposeError;

pub use config::{CacheConfig, MapConfig, RenderMethod};
pub use photos::PhotoMap;
pub use services::MapServices;
pub use session::{MapSession, RenderOptions};
pub use windowed::{WindowImage, WindowedSearchDriver};

/// Environment variable holding the Flickr API key.
pub const FLICKR_API_KEY_ENV: &str = "FLICKR_API_KEY";

/// Environment variable holding the `GeoNames` account name.
pub const GEONAMES_USERNAME_ENV: &str = "GEONAMES_USERNAME";

/// Errors from building or running a map session.
#[derive(Debug, Error)]
pub enum MapError {
    /// Composition failed, typically because there was nothing to map.
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required credential is not set.
    #[error("Environment variable {0} is not set")]
    MissingCredential(&'static str),

    /// A service is missing from the registry.
    #[error("Unknown service '{0}'")]
    UnknownService(String),
}

/// Errors from loading a [`MapConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for a configuration.
    #[error("TOML error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Which value is wrong and why.
        message: String,
    },
}
