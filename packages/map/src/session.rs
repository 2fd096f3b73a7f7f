//! One render, from points to canvas.

use std::sync::Arc;

use trailmap_compose::{CompositionPipeline, LayerOptions, Painter};
use trailmap_geo_models::Point;
use trailmap_places::PlaceShapeResolver;
use trailmap_streets::StreetResolver;

use crate::{MapConfig, MapError, MapServices};

/// Optional point layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub draw_points: bool,
    pub draw_points_as_line: bool,
}

/// Per-render state: resolvers, configuration and the pipeline whose
/// viewport gets pinned during the render.
///
/// Sessions are cheap; build a new one per map.
pub struct MapSession {
    streets: StreetResolver,
    places: Option<PlaceShapeResolver>,
    pipeline: CompositionPipeline,
    config: MapConfig,
}

impl MapSession {
    #[must_use]
    pub fn new(services: &MapServices, config: &MapConfig) -> Self {
        let streets = StreetResolver::new(services.streets.clone(), services.street_cache.clone())
            .with_concurrency(config.concurrency)
            .with_progress(Arc::clone(&services.progress));

        let places = services
            .places
            .clone()
            .filter(|_| config.draw_place_outlines)
            .map(|service| {
                PlaceShapeResolver::new(service, services.place_cache.clone())
                    .with_progress(Arc::clone(&services.progress))
            });

        Self {
            streets,
            places,
            pipeline: CompositionPipeline::new(config.render_mode(), config.palette),
            config: config.clone(),
        }
    }

    /// Renders `points` with their nearby streets.
    ///
    /// When place outlines are enabled, the outlines of the places the
    /// points fall in are drawn underneath and the viewport is fitted to
    /// them instead of the points.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Compose`] if there is nothing to derive a
    /// viewport from.
    pub async fn render<P: Painter>(
        &mut self,
        painter: &mut P,
        points: &[Point],
        options: RenderOptions,
    ) -> Result<P::Canvas, MapError> {
        let mut place_outlines = None;

        if let Some(places) = &self.places {
            let shapes = places
                .resolve(points, self.config.place_type_filter())
                .await;

            if shapes.points.is_empty() {
                self.pipeline.establish_viewport(points)?;
            } else {
                self.pipeline.establish_viewport(&shapes.points)?;
            }
            place_outlines = Some(shapes.shapes);
        }

        let buckets = self.streets.resolve(points, self.config.max_distance).await;

        let layers = LayerOptions {
            draw_points: options.draw_points,
            draw_points_as_line: options.draw_points_as_line,
            place_outlines,
        };

        Ok(self.pipeline.render(painter, points, &buckets, &layers)?)
    }
}
