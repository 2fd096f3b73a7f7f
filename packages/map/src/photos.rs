//! A single map of everything a photo search returns.

use std::sync::Arc;

use trailmap_compose::Painter;
use trailmap_search::{PhotoSearch, SearchQuery, paginate};

use crate::{MapConfig, MapError, MapServices, MapSession, RenderOptions};

/// Pages through one photo search and maps every photo location with a
/// marker. No upload windows; see [`crate::WindowedSearchDriver`] for that.
pub struct PhotoMap {
    search: Arc<dyn PhotoSearch>,
    services: MapServices,
    config: MapConfig,
    per_page: Option<u32>,
}

impl PhotoMap {
    #[must_use]
    pub fn new(search: Arc<dyn PhotoSearch>, services: MapServices, config: MapConfig) -> Self {
        Self {
            search,
            services,
            config,
            per_page: None,
        }
    }

    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Runs `query` to the last page and renders the results.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Compose`] if the search found no located photos.
    pub async fn render<P: Painter>(
        &self,
        painter: &mut P,
        query: &SearchQuery,
    ) -> Result<P::Canvas, MapError> {
        let points = paginate(self.search.as_ref(), query, self.per_page).await;
        log::info!("Mapping {} photos", points.len());

        MapSession::new(&self.services, &self.config)
            .render(
                painter,
                &points,
                RenderOptions {
                    draw_points: true,
                    draw_points_as_line: false,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use trailmap_compose::{ComposeError, DisplayListPainter, Geometry, LayerKind};
    use trailmap_geo_models::Point;
    use trailmap_search::{SearchError, SearchPage};
    use trailmap_streets::{StreetError, StreetService};

    struct NoStreets;

    #[async_trait]
    impl StreetService for NoStreets {
        async fn nearby_streets(&self, _point: Point) -> Result<serde_json::Value, StreetError> {
            Ok(serde_json::json!({"streetSegment": []}))
        }
    }

    /// Serves `pages` pages of two photos each and records every request.
    struct PagedPhotos {
        pages: u32,
        requests: Mutex<Vec<(SearchQuery, u32)>>,
    }

    impl PagedPhotos {
        fn new(pages: u32) -> Arc<Self> {
            Arc::new(Self {
                pages,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PhotoSearch for PagedPhotos {
        async fn search_page(
            &self,
            query: &SearchQuery,
            page: u32,
            _per_page: u32,
        ) -> Result<SearchPage, SearchError> {
            self.requests.lock().unwrap().push((query.clone(), page));
            if self.pages == 0 {
                return Ok(SearchPage::default());
            }
            let offset = f64::from(page) / 100.0;
            Ok(SearchPage {
                pages: self.pages,
                points: vec![
                    Point::new(51.50 + offset, -0.12),
                    Point::new(51.51 + offset, -0.10),
                ],
            })
        }
    }

    fn photo_map(search: Arc<PagedPhotos>) -> PhotoMap {
        let services = MapServices::new(Arc::new(NoStreets), None);
        let config = MapConfig {
            cache: crate::CacheConfig {
                persistent: false,
                ..crate::CacheConfig::default()
            },
            ..MapConfig::default()
        };
        PhotoMap::new(search, services, config)
    }

    #[tokio::test]
    async fn every_page_lands_on_one_map() {
        let search = PagedPhotos::new(3);
        let query = SearchQuery::user_photos("35034348999@N01", "44418", Some("ff".to_string()));

        let canvas = photo_map(search.clone())
            .per_page(2)
            .render(&mut DisplayListPainter, &query)
            .await
            .unwrap();

        let markers = canvas
            .layers
            .iter()
            .find(|l| l.kind == LayerKind::Points)
            .map(|l| match &l.geometry {
                Geometry::Points(points) => points.len(),
                _ => 0,
            });
        assert_eq!(markers, Some(6));

        let requests = search.requests.lock().unwrap();
        assert_eq!(
            requests.iter().map(|(_, page)| *page).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        for (sent, _) in requests.iter() {
            assert_eq!(sent, &query);
            assert!(sent.min_upload_date.is_none());
        }
    }

    #[tokio::test]
    async fn search_without_photos_has_nothing_to_map() {
        let err = photo_map(PagedPhotos::new(0))
            .render(&mut DisplayListPainter, &SearchQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MapError::Compose(ComposeError::Viewport(_))));
    }
}
