//! Viewport to canvas projection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use trailmap_geo_models::{BoundingBox, Point};
use trailmap_viewport::{compute_bounding_box, expand};

use crate::ComposeError;
use crate::layer::PixelPoint;
use crate::tiles::{MAX_ZOOM, TILE_SIZE, TileCoordinate, TileProvider};

/// How the viewport and canvas size are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RenderMode {
    /// Fit the exact extent of the points into a canvas of fixed size.
    Extent { width: u32, height: u32 },
    /// Expand the extent by `margin` nautical miles and render at a fixed
    /// zoom. The canvas covers every tile the expanded box touches.
    Zoom { zoom: u8, margin: f64 },
}

impl RenderMode {
    pub const DEFAULT_WIDTH: u32 = 2048;
    pub const DEFAULT_HEIGHT: u32 = 1024;
    pub const DEFAULT_ZOOM: u8 = 16;
    pub const DEFAULT_MARGIN: f64 = 0.5;
    /// Deepest zoom level tiles are addressed at.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const MAX_ZOOM: u8 = MAX_ZOOM as u8;
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Extent {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

/// A viewport pinned to a zoom level and canvas.
#[derive(Clone)]
pub struct MapProjection {
    provider: Arc<dyn TileProvider>,
    bbox: BoundingBox,
    zoom: f64,
    origin: TileCoordinate,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for MapProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapProjection")
            .field("bbox", &self.bbox)
            .field("zoom", &self.zoom)
            .field("origin", &self.origin)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl MapProjection {
    /// Derives a projection covering `points`.
    ///
    /// # Errors
    ///
    /// * [`ComposeError::Viewport`] if `points` is empty or the margin is
    ///   invalid
    /// * [`ComposeError::InvalidCanvas`] if an extent canvas has no area
    /// * [`ComposeError::InvalidZoom`] if a fixed zoom is deeper than
    ///   [`RenderMode::MAX_ZOOM`]
    pub fn for_points(
        provider: Arc<dyn TileProvider>,
        mode: RenderMode,
        points: &[Point],
    ) -> Result<Self, ComposeError> {
        let bbox = compute_bounding_box(points)?;

        match mode {
            RenderMode::Extent { width, height } => Self::by_extent(provider, bbox, width, height),
            RenderMode::Zoom { zoom, margin } => {
                if zoom > RenderMode::MAX_ZOOM {
                    return Err(ComposeError::InvalidZoom(f64::from(zoom)));
                }
                let expanded = expand(&bbox, margin)?;
                Self::by_zoom(provider, expanded, f64::from(zoom))
            }
        }
    }

    /// Picks the highest zoom at which `bbox` fits a `width` by `height`
    /// canvas, centred on the box.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidCanvas`] if either dimension is zero.
    pub fn by_extent(
        provider: Arc<dyn TileProvider>,
        bbox: BoundingBox,
        width: u32,
        height: u32,
    ) -> Result<Self, ComposeError> {
        if width == 0 || height == 0 {
            return Err(ComposeError::InvalidCanvas { width, height });
        }

        let tl = provider.location_coordinate(bbox.north_west()).zoom_to(0.0);
        let br = provider.location_coordinate(bbox.south_east()).zoom_to(0.0);

        let column_span = br.column - tl.column;
        let row_span = br.row - tl.row;

        let mut scales = Vec::with_capacity(2);
        if column_span > 0.0 {
            scales.push(f64::from(width) / (TILE_SIZE * column_span));
        }
        if row_span > 0.0 {
            scales.push(f64::from(height) / (TILE_SIZE * row_span));
        }

        let zoom = scales
            .into_iter()
            .reduce(f64::min)
            .map_or(MAX_ZOOM, |scale| scale.log2().clamp(0.0, MAX_ZOOM));

        let center = TileCoordinate::new(
            (tl.row + br.row) / 2.0,
            (tl.column + br.column) / 2.0,
            0.0,
        )
        .zoom_to(zoom);

        let origin = TileCoordinate::new(
            center.row - f64::from(height) / TILE_SIZE / 2.0,
            center.column - f64::from(width) / TILE_SIZE / 2.0,
            zoom,
        );

        log::debug!("Extent projection at zoom {zoom:.2} for {width}x{height}");

        Ok(Self {
            provider,
            bbox,
            zoom,
            origin,
            width,
            height,
        })
    }

    /// Renders `bbox` at a fixed zoom. The canvas is aligned to the tile
    /// grid and spans every tile the box touches, at least one.
    ///
    /// # Errors
    ///
    /// * [`ComposeError::InvalidZoom`] if `zoom` is outside `0..=MAX_ZOOM`
    /// * [`ComposeError::CanvasTooLarge`] if the tile span does not fit a
    ///   `u32` pixel canvas
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn by_zoom(
        provider: Arc<dyn TileProvider>,
        bbox: BoundingBox,
        zoom: f64,
    ) -> Result<Self, ComposeError> {
        if !(0.0..=MAX_ZOOM).contains(&zoom) {
            return Err(ComposeError::InvalidZoom(zoom));
        }

        let tl = provider
            .location_coordinate(bbox.north_west())
            .zoom_to(zoom)
            .container();
        let br = provider
            .location_coordinate(bbox.south_east())
            .zoom_to(zoom)
            .container();

        let rows = (br.row - tl.row + 1.0).max(1.0) as u32;
        let columns = (br.column - tl.column + 1.0).max(1.0) as u32;
        let tile = TILE_SIZE as u32;

        let (Some(width), Some(height)) = (columns.checked_mul(tile), rows.checked_mul(tile))
        else {
            return Err(ComposeError::CanvasTooLarge { columns, rows });
        };

        log::debug!("Zoom {zoom} projection spans {columns}x{rows} tiles");

        Ok(Self {
            provider,
            bbox,
            zoom,
            origin: tl,
            width,
            height,
        })
    }

    /// Pixel position of `location` on the canvas.
    #[must_use]
    pub fn locate(&self, location: Point) -> PixelPoint {
        let coord = self
            .provider
            .location_coordinate(location)
            .zoom_to(self.zoom);
        PixelPoint::new(
            (coord.column - self.origin.column) * TILE_SIZE,
            (coord.row - self.origin.row) * TILE_SIZE,
        )
    }

    #[must_use]
    pub fn locate_all(&self, locations: &[Point]) -> Vec<PixelPoint> {
        locations.iter().map(|p| self.locate(*p)).collect()
    }

    /// The geographic box this projection was built from.
    #[must_use]
    pub const fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}
