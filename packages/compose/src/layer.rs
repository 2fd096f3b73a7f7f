//! Render layers: projected geometry plus style.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    #[must_use]
    pub const fn grey(level: f64) -> Self {
        Self::new(level, level, level)
    }
}

/// A position on the canvas, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a layer depicts. Layers are always drawn in declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    PlaceOutlines,
    Points,
    PointLine,
    SmallRoads,
    MediumRoads,
    BigRoads,
}

/// Projected geometry of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum Geometry {
    /// Closed rings, filled.
    Polygons(Vec<Vec<PixelPoint>>),
    /// Point markers.
    Points(Vec<PixelPoint>),
    /// Open polylines, stroked.
    Lines(Vec<Vec<PixelPoint>>),
}

impl Geometry {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Polygons(items) | Self::Lines(items) => items.is_empty(),
            Self::Points(items) => items.is_empty(),
        }
    }
}

/// How a layer is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub color: Rgb,
    /// Fill opacity for polygons and markers, stroke opacity for lines.
    pub opacity: f64,
    /// Stroke width in pixels. Zero for unstroked geometry.
    pub stroke_width: f64,
    /// Border opacity for polygons.
    pub border_opacity: f64,
}

/// One drawable layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLayer {
    pub kind: LayerKind,
    pub geometry: Geometry,
    pub style: LayerStyle,
}
