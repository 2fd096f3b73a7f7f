//! One map per upload-date window of a photo search.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use trailmap_compose::Painter;
use trailmap_geo_models::Point;
use trailmap_search::{PhotoSearch, SearchQuery, TimeWindow, paginate, plan_windows};

use crate::{MapConfig, MapError, MapServices, MapSession, RenderOptions};

/// A canvas rendered for one window.
#[derive(Debug, Clone)]
pub struct WindowImage<C> {
    pub window: TimeWindow,
    pub canvas: C,
}

/// Runs a photo search window by window and renders the photo locations.
pub struct WindowedSearchDriver {
    search: Arc<dyn PhotoSearch>,
    services: MapServices,
    config: MapConfig,
    collect: bool,
    per_page: Option<u32>,
}

impl WindowedSearchDriver {
    /// By default every map shows the photos of all windows so far.
    #[must_use]
    pub fn new(search: Arc<dyn PhotoSearch>, services: MapServices, config: MapConfig) -> Self {
        Self {
            search,
            services,
            config,
            collect: true,
            per_page: None,
        }
    }

    /// `true` to accumulate points across windows, `false` to map each
    /// window on its own.
    #[must_use]
    pub const fn collect(mut self, collect: bool) -> Self {
        self.collect = collect;
        self
    }

    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Searches each window of `days_offset` days starting at `start` and
    /// renders a map for every window with points to show.
    ///
    /// Windows that would start at or after `now` are not searched.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if a window's map cannot be composed.
    pub async fn run<P: Painter>(
        &self,
        painter: &mut P,
        query: &SearchQuery,
        start: NaiveDate,
        days_total: u32,
        days_offset: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<WindowImage<P::Canvas>>, MapError> {
        let windows = plan_windows(start, days_total, days_offset, now);
        let mut images = Vec::new();
        let mut points: Vec<Point> = Vec::new();

        for window in windows {
            log::info!("Searching photos uploaded {} to {}", window.start, window.end);

            let found = paginate(self.search.as_ref(), &query.within(&window), self.per_page).await;

            if self.collect {
                points.extend(found);
            } else {
                points = found;
            }

            if points.is_empty() {
                log::debug!("Nothing to map for window starting {}", window.start);
                continue;
            }

            let mut session = MapSession::new(&self.services, &self.config);
            let canvas = session
                .render(
                    painter,
                    &points,
                    RenderOptions {
                        draw_points: true,
                        draw_points_as_line: false,
                    },
                )
                .await?;

            images.push(WindowImage { window, canvas });
        }

        log::info!("Rendered {} window maps", images.len());
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use trailmap_compose::{DisplayListPainter, Geometry, LayerKind};
    use trailmap_search::{SearchError, SearchPage};
    use trailmap_streets::{StreetError, StreetService};

    struct NoStreets;

    #[async_trait]
    impl StreetService for NoStreets {
        async fn nearby_streets(&self, _point: Point) -> Result<serde_json::Value, StreetError> {
            Ok(serde_json::json!({"streetSegment": []}))
        }
    }

    /// Returns one photo per window, except for windows listed as empty.
    struct WeeklyPhotos {
        empty_windows: Vec<i64>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl WeeklyPhotos {
        fn new(empty_windows: Vec<i64>) -> Arc<Self> {
            Arc::new(Self {
                empty_windows,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PhotoSearch for WeeklyPhotos {
        async fn search_page(
            &self,
            query: &SearchQuery,
            _page: u32,
            _per_page: u32,
        ) -> Result<SearchPage, SearchError> {
            self.queries.lock().unwrap().push(query.clone());
            let start = query.min_upload_date.unwrap_or_default();
            if self.empty_windows.contains(&start) {
                return Ok(SearchPage::default());
            }
            #[allow(clippy::cast_precision_loss)]
            let offset = (start % 1_000_000) as f64 / 1_000_000.0;
            Ok(SearchPage {
                pages: 1,
                points: vec![Point::new(40.0 + offset, -74.0 + offset)],
            })
        }
    }

    fn driver(search: Arc<WeeklyPhotos>) -> WindowedSearchDriver {
        let services = MapServices::new(Arc::new(NoStreets), None);
        let config = MapConfig {
            cache: crate::CacheConfig {
                persistent: false,
                ..crate::CacheConfig::default()
            },
            ..MapConfig::default()
        };
        WindowedSearchDriver::new(search, services, config)
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2009, 3, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn marker_count(layers: &[trailmap_compose::RenderLayer]) -> usize {
        layers
            .iter()
            .find(|l| l.kind == LayerKind::Points)
            .map_or(0, |l| match &l.geometry {
                Geometry::Points(points) => points.len(),
                _ => 0,
            })
    }

    #[tokio::test]
    async fn one_image_per_window_with_collected_points() {
        let search = WeeklyPhotos::new(vec![]);
        let images = driver(search.clone())
            .run(
                &mut DisplayListPainter,
                &SearchQuery::default(),
                start(),
                14,
                7,
                now(),
            )
            .await
            .unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(marker_count(&images[0].canvas.layers), 1);
        assert_eq!(marker_count(&images[1].canvas.layers), 2);

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(
            queries[0].max_upload_date.unwrap() + 1,
            queries[1].min_upload_date.unwrap()
        );
    }

    #[tokio::test]
    async fn replace_mode_maps_each_window_alone() {
        let search = WeeklyPhotos::new(vec![]);
        let images = driver(search)
            .collect(false)
            .run(
                &mut DisplayListPainter,
                &SearchQuery::default(),
                start(),
                21,
                7,
                now(),
            )
            .await
            .unwrap();

        assert_eq!(images.len(), 3);
        for image in &images {
            assert_eq!(marker_count(&image.canvas.layers), 1);
        }
    }

    #[tokio::test]
    async fn empty_windows_produce_no_image() {
        let first_window = Utc.with_ymd_and_hms(2009, 3, 1, 0, 0, 0).unwrap().timestamp();
        let search = WeeklyPhotos::new(vec![first_window]);
        let images = driver(search)
            .collect(false)
            .run(
                &mut DisplayListPainter,
                &SearchQuery::default(),
                start(),
                14,
                7,
                now(),
            )
            .await
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(
            images[0].window.start,
            Utc.with_ymd_and_hms(2009, 3, 8, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn future_windows_are_not_searched() {
        let search = WeeklyPhotos::new(vec![]);
        let images = driver(search.clone())
            .run(
                &mut DisplayListPainter,
                &SearchQuery::default(),
                start(),
                28,
                7,
                Utc.with_ymd_and_hms(2009, 3, 9, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(search.queries.lock().unwrap().len(), 2);
    }
}
