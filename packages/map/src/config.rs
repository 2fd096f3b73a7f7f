//! Runtime rendering configuration.
//!
//! Read from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use trailmap_cache::CacheDataset;
use trailmap_compose::{Palette, RenderMode};

use crate::ConfigError;

/// How the canvas is sized.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderMethod {
    /// Fixed canvas size, zoom fitted to the points.
    #[default]
    Extent,
    /// Fixed zoom, canvas sized to the padded points.
    #[serde(alias = "bbox")]
    #[strum(to_string = "zoom", serialize = "bbox")]
    Zoom,
}

/// Cache database locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep lookups across runs in `DuckDB`. When false, caches live only
    /// for the process.
    pub persistent: bool,
    /// Street cache database. Defaults to the data directory.
    pub streets_db: Option<PathBuf>,
    /// Place shape cache database. Defaults to the data directory.
    pub places_db: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            streets_db: None,
            places_db: None,
        }
    }
}

impl CacheConfig {
    /// Database path for `dataset`, or `None` for an in-memory cache.
    #[must_use]
    pub fn db_path(&self, dataset: CacheDataset) -> Option<PathBuf> {
        if !self.persistent {
            return None;
        }
        let configured = match dataset {
            CacheDataset::Streets => self.streets_db.as_ref(),
            CacheDataset::PlaceShapes => self.places_db.as_ref(),
        };
        Some(
            configured
                .cloned()
                .unwrap_or_else(|| trailmap_cache::paths::cache_db_path(dataset)),
        )
    }
}

/// Settings for one rendering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub method: RenderMethod,
    /// Canvas width for [`RenderMethod::Extent`].
    pub width: u32,
    /// Canvas height for [`RenderMethod::Extent`].
    pub height: u32,
    /// Zoom level for [`RenderMethod::Zoom`].
    pub zoom: u8,
    /// Padding around the points for [`RenderMethod::Zoom`], in nautical
    /// miles.
    pub margin: f64,
    /// Street segments farther than this from their lookup point are
    /// dropped (km).
    pub max_distance: f64,
    pub palette: Palette,
    /// Street lookups allowed in flight at once.
    pub concurrency: usize,
    /// Draw the outlines of the places the points fall in.
    pub draw_place_outlines: bool,
    /// Place types whose outlines are drawn. Empty means all.
    pub valid_place_types: BTreeSet<u32>,
    pub cache: CacheConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            method: RenderMethod::Extent,
            width: RenderMode::DEFAULT_WIDTH,
            height: RenderMode::DEFAULT_HEIGHT,
            zoom: RenderMode::DEFAULT_ZOOM,
            margin: RenderMode::DEFAULT_MARGIN,
            max_distance: 0.1,
            palette: Palette::Pink,
            concurrency: 1,
            draw_place_outlines: false,
            valid_place_types: BTreeSet::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl MapConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// TOML, or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `text` is not valid TOML or holds
    /// out-of-range values.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that parse but cannot be rendered. Call again after
    /// overriding fields by hand.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.margin.is_nan() || self.margin < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!("margin must be non-negative, got {}", self.margin),
            });
        }
        if self.max_distance.is_nan() || self.max_distance < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "max_distance must be non-negative, got {}",
                    self.max_distance
                ),
            });
        }
        if self.zoom > RenderMode::MAX_ZOOM {
            return Err(ConfigError::Invalid {
                message: format!(
                    "zoom must be at most {}, got {}",
                    RenderMode::MAX_ZOOM,
                    self.zoom
                ),
            });
        }
        if self.method == RenderMethod::Extent && (self.width == 0 || self.height == 0) {
            return Err(ConfigError::Invalid {
                message: format!("canvas must not be empty, got {}x{}", self.width, self.height),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn render_mode(&self) -> RenderMode {
        match self.method {
            RenderMethod::Extent => RenderMode::Extent {
                width: self.width,
                height: self.height,
            },
            RenderMethod::Zoom => RenderMode::Zoom {
                zoom: self.zoom,
                margin: self.margin,
            },
        }
    }

    /// The place-type filter, if one is configured.
    #[must_use]
    pub fn place_type_filter(&self) -> Option<&BTreeSet<u32>> {
        (!self.valid_place_types.is_empty()).then_some(&self.valid_place_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = MapConfig::from_toml("").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(
            config.render_mode(),
            RenderMode::Extent {
                width: 2048,
                height: 1024
            }
        );
        assert!(config.place_type_filter().is_none());
    }

    #[test]
    fn parses_zoom_settings() {
        let config = MapConfig::from_toml(
            r#"
method = "bbox"
zoom = 15
margin = 0.25
palette = "flickr"
valid_place_types = [22, 7]
draw_place_outlines = true

[cache]
persistent = false
"#,
        )
        .unwrap();

        assert_eq!(config.method, RenderMethod::Zoom);
        assert_eq!(
            config.render_mode(),
            RenderMode::Zoom {
                zoom: 15,
                margin: 0.25
            }
        );
        assert_eq!(config.palette, Palette::Flickr);
        assert_eq!(
            config.place_type_filter().map(|t| t.iter().copied().collect::<Vec<_>>()),
            Some(vec![7, 22])
        );
        assert!(config.cache.db_path(CacheDataset::Streets).is_none());
    }

    #[test]
    fn configured_db_paths_are_used() {
        let config = MapConfig::from_toml(
            r#"
[cache]
places_db = "/tmp/places.duckdb"
"#,
        )
        .unwrap();

        assert_eq!(
            config.cache.db_path(CacheDataset::PlaceShapes),
            Some(PathBuf::from("/tmp/places.duckdb"))
        );
        assert!(
            config
                .cache
                .db_path(CacheDataset::Streets)
                .is_some_and(|p| p.ends_with("street_segments.duckdb"))
        );
    }

    #[test]
    fn rejects_negative_margin() {
        let err = MapConfig::from_toml("margin = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_zoom_past_the_deepest_tiles() {
        let err = MapConfig::from_toml("zoom = 40").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref message } if message.contains("40")));

        assert!(MapConfig::from_toml("zoom = 18").is_ok());
    }

    #[test]
    fn overridden_zoom_is_revalidated() {
        let config = MapConfig {
            zoom: 19,
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_palette() {
        let err = MapConfig::from_toml(r#"palette = "sepia""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("bbox".parse::<RenderMethod>().unwrap(), RenderMethod::Zoom);
        assert_eq!("zoom".parse::<RenderMethod>().unwrap(), RenderMethod::Zoom);
        assert_eq!(RenderMethod::Zoom.to_string(), "zoom");
    }
}
