//! Ordered layer composition.

use std::sync::Arc;

use trailmap_geo_models::{PlaceShape, Point, Polyline, RoadBucket, RoadBuckets};

use crate::ComposeError;
use crate::layer::{Geometry, LayerKind, LayerStyle, PixelPoint, RenderLayer};
use crate::painter::Painter;
use crate::palette::Palette;
use crate::projection::{MapProjection, RenderMode};
use crate::tiles::{TileProvider, WebMercator};

const ROAD_OPACITY: f64 = 0.01;
const POINT_OPACITY: f64 = 0.01;
const OUTLINE_OPACITY: f64 = 0.01;
const POINT_LINE_OPACITY: f64 = 0.4;
const POINT_LINE_WIDTH: f64 = 10.0;

/// Optional layers for one render.
#[derive(Debug, Clone, Default)]
pub struct LayerOptions {
    /// Draw a marker per point.
    pub draw_points: bool,
    /// Draw one line through the points in input order.
    pub draw_points_as_line: bool,
    /// Place outlines drawn beneath everything else.
    pub place_outlines: Option<Vec<PlaceShape>>,
}

/// Composes one map: projection, background, then the layer stack.
pub struct CompositionPipeline {
    provider: Arc<dyn TileProvider>,
    mode: RenderMode,
    palette: Palette,
    projection: Option<MapProjection>,
}

impl CompositionPipeline {
    #[must_use]
    pub fn new(mode: RenderMode, palette: Palette) -> Self {
        Self::with_provider(Arc::new(WebMercator), mode, palette)
    }

    #[must_use]
    pub fn with_provider(
        provider: Arc<dyn TileProvider>,
        mode: RenderMode,
        palette: Palette,
    ) -> Self {
        Self {
            provider,
            mode,
            palette,
            projection: None,
        }
    }

    /// Pins the viewport to `points`. Later renders draw on this viewport
    /// even when their own points differ.
    ///
    /// # Errors
    ///
    /// Returns an error if no projection can be derived from `points`.
    pub fn establish_viewport(&mut self, points: &[Point]) -> Result<&MapProjection, ComposeError> {
        let projection = MapProjection::for_points(self.provider.clone(), self.mode, points)?;
        Ok(self.projection.insert(projection))
    }

    #[must_use]
    pub const fn projection(&self) -> Option<&MapProjection> {
        self.projection.as_ref()
    }

    /// Renders the map.
    ///
    /// Layers are drawn bottom to top: place outlines, point markers, the
    /// point line, then small, medium and big roads. Empty layers are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no viewport was established and none can be
    /// derived from `points`.
    pub fn render<P: Painter>(
        &mut self,
        painter: &mut P,
        points: &[Point],
        buckets: &RoadBuckets,
        options: &LayerOptions,
    ) -> Result<P::Canvas, ComposeError> {
        let projection = match self.projection.take() {
            Some(projection) => projection,
            None => MapProjection::for_points(self.provider.clone(), self.mode, points)?,
        };
        let palette = self.palette;
        let projection = &*self.projection.insert(projection);

        let layers = build_layers(palette, projection, points, buckets, options);

        log::debug!(
            "Drawing {} layers on {}x{} canvas",
            layers.len(),
            projection.width(),
            projection.height()
        );

        let mut canvas = painter.blank(
            projection.width(),
            projection.height(),
            palette.background(),
        );
        for layer in &layers {
            log::debug!("draw {}", layer.kind);
            canvas = painter.draw(canvas, layer);
        }

        Ok(canvas)
    }
}

fn build_layers(
    palette: Palette,
    projection: &MapProjection,
    points: &[Point],
    buckets: &RoadBuckets,
    options: &LayerOptions,
) -> Vec<RenderLayer> {
    let mut layers = Vec::with_capacity(6);

    if let Some(outlines) = &options.place_outlines {
        layers.push(RenderLayer {
            kind: LayerKind::PlaceOutlines,
            geometry: Geometry::Polygons(project_lines(projection, outlines)),
            style: LayerStyle {
                color: palette.outlines(),
                opacity: OUTLINE_OPACITY,
                stroke_width: 0.0,
                border_opacity: 0.0,
            },
        });
    }

    if options.draw_points {
        layers.push(RenderLayer {
            kind: LayerKind::Points,
            geometry: Geometry::Points(projection.locate_all(points)),
            style: LayerStyle {
                color: palette.points(),
                opacity: POINT_OPACITY,
                stroke_width: 0.0,
                border_opacity: 0.0,
            },
        });
    }

    if options.draw_points_as_line && points.len() > 1 {
        layers.push(RenderLayer {
            kind: LayerKind::PointLine,
            geometry: Geometry::Lines(vec![projection.locate_all(points)]),
            style: LayerStyle {
                color: palette.points(),
                opacity: POINT_LINE_OPACITY,
                stroke_width: POINT_LINE_WIDTH,
                border_opacity: 0.0,
            },
        });
    }

    for (kind, bucket) in [
        (LayerKind::SmallRoads, RoadBucket::Small),
        (LayerKind::MediumRoads, RoadBucket::Medium),
        (LayerKind::BigRoads, RoadBucket::Big),
    ] {
        layers.push(RenderLayer {
            kind,
            geometry: Geometry::Lines(project_lines(projection, buckets.bucket(bucket))),
            style: LayerStyle {
                color: palette.roads(),
                opacity: ROAD_OPACITY,
                stroke_width: road_width(bucket),
                border_opacity: 0.0,
            },
        });
    }

    layers.retain(|layer| !layer.geometry.is_empty());
    layers
}

const fn road_width(bucket: RoadBucket) -> f64 {
    match bucket {
        RoadBucket::Small => 2.0,
        RoadBucket::Medium => 4.0,
        RoadBucket::Big => 6.0,
    }
}

fn project_lines(
    projection: &MapProjection,
    lines: &[Polyline],
) -> Vec<Vec<PixelPoint>> {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| projection.locate_all(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Rgb;
    use crate::painter::DisplayListPainter;

    /// Records the call sequence.
    #[derive(Default)]
    struct RecordingPainter {
        calls: Vec<String>,
    }

    impl Painter for RecordingPainter {
        type Canvas = (u32, u32);

        fn blank(&mut self, width: u32, height: u32, _background: Rgb) -> (u32, u32) {
            self.calls.push("blank".to_string());
            (width, height)
        }

        fn draw(&mut self, canvas: (u32, u32), layer: &RenderLayer) -> (u32, u32) {
            self.calls.push(layer.kind.to_string());
            canvas
        }
    }

    fn line(a: (f64, f64), b: (f64, f64)) -> Polyline {
        vec![Point::new(a.0, a.1), Point::new(b.0, b.1)]
    }

    fn points() -> Vec<Point> {
        vec![Point::new(37.76, -122.45), Point::new(37.80, -122.40)]
    }

    fn full_buckets() -> RoadBuckets {
        RoadBuckets {
            big: vec![line((37.77, -122.44), (37.78, -122.43))],
            medium: vec![line((37.77, -122.42), (37.79, -122.41))],
            small: vec![line((37.765, -122.44), (37.766, -122.43))],
        }
    }

    fn outline() -> Vec<PlaceShape> {
        vec![vec![
            Point::new(37.70, -122.50),
            Point::new(37.85, -122.50),
            Point::new(37.85, -122.35),
        ]]
    }

    #[test]
    fn layers_are_drawn_bottom_to_top() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let mut painter = RecordingPainter::default();
        let options = LayerOptions {
            draw_points: true,
            draw_points_as_line: true,
            place_outlines: Some(outline()),
        };

        pipeline
            .render(&mut painter, &points(), &full_buckets(), &options)
            .unwrap();

        assert_eq!(
            painter.calls,
            vec![
                "blank",
                "place_outlines",
                "points",
                "point_line",
                "small_roads",
                "medium_roads",
                "big_roads"
            ]
        );
    }

    #[test]
    fn empty_layers_are_skipped() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let mut painter = RecordingPainter::default();
        let buckets = RoadBuckets {
            medium: vec![line((37.77, -122.42), (37.79, -122.41))],
            ..RoadBuckets::default()
        };

        pipeline
            .render(&mut painter, &points(), &buckets, &LayerOptions::default())
            .unwrap();

        assert_eq!(painter.calls, vec!["blank", "medium_roads"]);
    }

    #[test]
    fn road_styles_follow_bucket() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let canvas = pipeline
            .render(
                &mut DisplayListPainter,
                &points(),
                &full_buckets(),
                &LayerOptions::default(),
            )
            .unwrap();

        let widths: Vec<f64> = canvas.layers.iter().map(|l| l.style.stroke_width).collect();
        assert_eq!(widths, vec![2.0, 4.0, 6.0]);
        for layer in &canvas.layers {
            assert_eq!(layer.style.color, Rgb::new(1.0, 0.0, 132.0 / 255.0));
            assert!((layer.style.opacity - 0.01).abs() < f64::EPSILON);
        }
        assert_eq!(canvas.background, Rgb::WHITE);
        assert_eq!((canvas.width, canvas.height), (2048, 1024));
    }

    #[test]
    fn palette_changes_only_colours() {
        let options = LayerOptions {
            draw_points: true,
            draw_points_as_line: true,
            place_outlines: Some(outline()),
        };

        let mut pink = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let mut flickr = CompositionPipeline::new(RenderMode::default(), Palette::Flickr);
        let a = pink
            .render(&mut DisplayListPainter, &points(), &full_buckets(), &options)
            .unwrap();
        let b = flickr
            .render(&mut DisplayListPainter, &points(), &full_buckets(), &options)
            .unwrap();

        assert_eq!(a.layers.len(), b.layers.len());
        for (x, y) in a.layers.iter().zip(&b.layers) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.geometry, y.geometry);
            assert!((x.style.opacity - y.style.opacity).abs() < f64::EPSILON);
            assert!((x.style.stroke_width - y.style.stroke_width).abs() < f64::EPSILON);
        }
        assert_eq!(b.layers[1].style.color, Rgb::WHITE);
        assert_eq!(a.layers[0].style.color, Rgb::BLACK);
        assert_eq!(b.layers[0].style.color, Rgb::BLACK);
    }

    #[test]
    fn point_line_style() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let options = LayerOptions {
            draw_points_as_line: true,
            ..LayerOptions::default()
        };
        let canvas = pipeline
            .render(
                &mut DisplayListPainter,
                &points(),
                &RoadBuckets::default(),
                &options,
            )
            .unwrap();

        assert_eq!(canvas.layers.len(), 1);
        let layer = &canvas.layers[0];
        assert_eq!(layer.kind, LayerKind::PointLine);
        assert!((layer.style.opacity - 0.4).abs() < f64::EPSILON);
        assert!((layer.style.stroke_width - 10.0).abs() < f64::EPSILON);
        assert_eq!(layer.style.color, Rgb::grey(0.7));
    }

    #[test]
    fn established_viewport_is_kept() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let wide = vec![Point::new(37.0, -123.0), Point::new(38.5, -121.5)];
        let zoom = pipeline.establish_viewport(&wide).unwrap().zoom();

        pipeline
            .render(
                &mut DisplayListPainter,
                &points(),
                &RoadBuckets::default(),
                &LayerOptions::default(),
            )
            .unwrap();

        let kept = pipeline.projection().unwrap();
        assert!((kept.zoom() - zoom).abs() < f64::EPSILON);
        assert!((kept.bbox().south_west.latitude - 37.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_mode_canvas_is_tile_aligned() {
        let mut pipeline = CompositionPipeline::new(
            RenderMode::Zoom {
                zoom: 16,
                margin: 0.5,
            },
            Palette::Pink,
        );
        let canvas = pipeline
            .render(
                &mut DisplayListPainter,
                &points(),
                &full_buckets(),
                &LayerOptions::default(),
            )
            .unwrap();

        assert_eq!(canvas.width % 256, 0);
        assert_eq!(canvas.height % 256, 0);
    }

    #[test]
    fn empty_points_without_viewport_fail() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Pink);
        let err = pipeline
            .render(
                &mut DisplayListPainter,
                &[],
                &full_buckets(),
                &LayerOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ComposeError::Viewport(_)));
    }

    #[test]
    fn display_list_serializes() {
        let mut pipeline = CompositionPipeline::new(RenderMode::default(), Palette::Flickr);
        let canvas = pipeline
            .render(
                &mut DisplayListPainter,
                &points(),
                &full_buckets(),
                &LayerOptions::default(),
            )
            .unwrap();

        assert_eq!(canvas.item_count(), 3);
        let json = serde_json::to_value(&canvas).unwrap();
        assert_eq!(json["layers"][0]["kind"], "small_roads");
        assert_eq!(json["layers"][0]["geometry"]["type"], "lines");
    }
}
