//! Drawing backends.

use serde::{Deserialize, Serialize};

use crate::layer::{RenderLayer, Rgb};

/// Draws layers onto a canvas.
///
/// The canvas is threaded through by value so a painter can return a new
/// surface from each call.
pub trait Painter {
    type Canvas;

    /// Creates a canvas filled with `background`.
    fn blank(&mut self, width: u32, height: u32, background: Rgb) -> Self::Canvas;

    /// Draws `layer` on top of everything drawn so far.
    fn draw(&mut self, canvas: Self::Canvas, layer: &RenderLayer) -> Self::Canvas;
}

/// A canvas recorded as the ordered list of layers drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub layers: Vec<RenderLayer>,
}

impl DisplayList {
    /// Number of drawable items across all layers.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| match &layer.geometry {
                crate::Geometry::Polygons(items) | crate::Geometry::Lines(items) => items.len(),
                crate::Geometry::Points(items) => items.len(),
            })
            .sum()
    }
}

/// Painter that records a [`DisplayList`] instead of rasterizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayListPainter;

impl Painter for DisplayListPainter {
    type Canvas = DisplayList;

    fn blank(&mut self, width: u32, height: u32, background: Rgb) -> DisplayList {
        DisplayList {
            width,
            height,
            background,
            layers: Vec::new(),
        }
    }

    fn draw(&mut self, mut canvas: DisplayList, layer: &RenderLayer) -> DisplayList {
        canvas.layers.push(layer.clone());
        canvas
    }
}
