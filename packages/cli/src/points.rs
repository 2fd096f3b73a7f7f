//! CSV point files.

use std::io::Read;
use std::path::PathBuf;

use trailmap_geo_models::{Point, PointSource};

/// A CSV file with `latitude` and `longitude` columns. Other columns are
/// ignored.
pub struct CsvPoints {
    path: PathBuf,
}

impl CsvPoints {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PointSource for CsvPoints {
    type Error = csv::Error;

    fn points(&self) -> Result<Vec<Point>, csv::Error> {
        let file = std::fs::File::open(&self.path)?;
        read_points(file)
    }
}

fn read_points<R: Read>(reader: R) -> Result<Vec<Point>, csv::Error> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_points_in_file_order() {
        let data = "latitude,longitude\n37.76,-122.45\n 37.78 , -122.42 \n";
        let points = read_points(data.as_bytes()).unwrap();
        assert_eq!(
            points,
            vec![Point::new(37.76, -122.45), Point::new(37.78, -122.42)]
        );
    }

    #[test]
    fn ignores_extra_columns() {
        let data = "time,longitude,latitude\n2009-03-01T10:00:00Z,2.35,48.85\n";
        let points = read_points(data.as_bytes()).unwrap();
        assert_eq!(points, vec![Point::new(48.85, 2.35)]);
    }

    #[test]
    fn bad_coordinates_are_an_error() {
        let data = "latitude,longitude\nnorth,-122.45\n";
        assert!(read_points(data.as_bytes()).is_err());
    }

    #[test]
    fn empty_file_has_no_points() {
        assert!(read_points("latitude,longitude\n".as_bytes()).unwrap().is_empty());
    }
}
