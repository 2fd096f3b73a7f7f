//! Capped pagination over a photo search.

use trailmap_geo_models::Point;

use crate::{PhotoSearch, SearchQuery};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 250;

/// The most results the search service will page through for one query.
pub const MAX_RESULTS: u32 = 4000;

/// Fetches every page of `query`, up to [`MAX_RESULTS`] results.
///
/// Stops at the first failed page, when the service reports no pages, after
/// the last reported page, or when the page cap is reached, returning the
/// points gathered so far. Photos at `(0, 0)` carry no real location and
/// are dropped.
pub async fn paginate(
    service: &dyn PhotoSearch,
    query: &SearchQuery,
    per_page: Option<u32>,
) -> Vec<Point> {
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let max_pages = (MAX_RESULTS / per_page).max(1);

    let mut points = Vec::new();
    let mut total_pages: Option<u32> = None;
    let mut page = 1;

    while total_pages.is_none_or(|total| page <= total) {
        log::debug!(
            "Fetching page {page} of {}",
            total_pages.map_or_else(|| "?".to_string(), |n| n.to_string())
        );

        let result = match service.search_page(query, page, per_page).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Photo search failed on page {page}: {e}");
                break;
            }
        };

        let total = *total_pages.get_or_insert(result.pages);
        if total == 0 {
            log::warn!("Photo search returned no results");
            break;
        }

        points.extend(
            result
                .points
                .into_iter()
                .filter(|point| !point.is_null_island()),
        );

        if page >= max_pages {
            log::warn!("Photo search exceeds {MAX_RESULTS} results, stopping at page {page}");
            break;
        }

        page += 1;
    }

    log::info!("Photo search found {} points", points.len());
    points
}
