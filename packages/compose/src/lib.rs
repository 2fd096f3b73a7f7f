#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map composition.
//!
//! Turns points, bucketed street polylines and optional place outlines
//! into an ordered stack of [`RenderLayer`]s projected onto a Web Mercator
//! canvas, and hands each layer to a [`Painter`].

pub mod layer;
pub mod painter;
pub mod palette;
pub mod pipeline;
pub mod projection;
pub mod tiles;

use thiserror::Error;
use trailmap_viewport::ViewportError;

pub use layer::{Geometry, LayerKind, LayerStyle, PixelPoint, RenderLayer, Rgb};
pub use painter::{DisplayList, DisplayListPainter, Painter};
pub use palette::Palette;
pub use pipeline::{CompositionPipeline, LayerOptions};
pub use projection::{MapProjection, RenderMode};
pub use tiles::{TILE_SIZE, TileCoordinate, TileProvider, WebMercator};

/// Errors from composing a map.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The viewport could not be derived from the input.
    #[error("Viewport error: {0}")]
    Viewport(#[from] ViewportError),

    /// The requested canvas has no area.
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    /// A fixed zoom outside the addressable tile levels.
    #[error("Invalid zoom {0}")]
    InvalidZoom(f64),

    /// The tile span at the requested zoom overflows the pixel canvas.
    #[error("Canvas of {columns}x{rows} tiles is too large")]
    CanvasTooLarge { columns: u32, rows: u32 },
}
