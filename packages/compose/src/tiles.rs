//! Web Mercator tile coordinates.

use std::f64::consts::PI;

use trailmap_geo_models::Point;

/// Edge length of one tile, in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Highest zoom level a projection will pick.
pub const MAX_ZOOM: f64 = 18.0;

/// Latitude limit of the Web Mercator square.
pub const MAX_LAT: f64 = 85.051_128_78;

/// A fractional position in the tile grid at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCoordinate {
    pub row: f64,
    pub column: f64,
    pub zoom: f64,
}

impl TileCoordinate {
    #[must_use]
    pub const fn new(row: f64, column: f64, zoom: f64) -> Self {
        Self { row, column, zoom }
    }

    /// The same position expressed at another zoom level.
    #[must_use]
    pub fn zoom_to(&self, zoom: f64) -> Self {
        let scale = (zoom - self.zoom).exp2();
        Self::new(self.row * scale, self.column * scale, zoom)
    }

    /// The tile containing this position.
    #[must_use]
    pub fn container(&self) -> Self {
        Self::new(self.row.floor(), self.column.floor(), self.zoom)
    }
}

/// Converts between geographic locations and tile coordinates.
pub trait TileProvider: Send + Sync {
    /// Projects a location into the tile grid.
    fn location_coordinate(&self, location: Point) -> TileCoordinate;

    /// Inverse of [`TileProvider::location_coordinate`].
    fn coordinate_location(&self, coordinate: &TileCoordinate) -> Point;
}

/// The spherical Web Mercator projection used by slippy-map tile servers.
/// Coordinates are produced at zoom 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl TileProvider for WebMercator {
    fn location_coordinate(&self, location: Point) -> TileCoordinate {
        let lat_rad = location.latitude.clamp(-MAX_LAT, MAX_LAT).to_radians();
        let column = (location.longitude + 180.0) / 360.0;
        let row = (1.0 - lat_rad.tan().asinh() / PI) / 2.0;
        TileCoordinate::new(row, column, 0.0)
    }

    fn coordinate_location(&self, coordinate: &TileCoordinate) -> Point {
        let base = coordinate.zoom_to(0.0);
        let longitude = base.column * 360.0 - 180.0;
        let latitude = (PI * (1.0 - 2.0 * base.row)).sinh().atan().to_degrees();
        Point::new(latitude, longitude)
    }
}
