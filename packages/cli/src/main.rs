#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `trailmap` command line.
//!
//! Renders a map from a CSV point file, one map of a Flickr photo search,
//! or one map per upload window of a search. Maps are written as JSON
//! display lists.
//!
//! Credentials come from `FLICKR_API_KEY` and `GEONAMES_USERNAME`; log
//! output is controlled with `RUST_LOG`.

mod points;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use trailmap_cli_utils::IndicatifProgress;
use trailmap_compose::{DisplayList, DisplayListPainter, Palette};
use trailmap_geo_models::PointSource;
use trailmap_map::services::flickr_photo_search;
use trailmap_map::{
    MapConfig, MapServices, MapSession, PhotoMap, RenderMethod, RenderOptions, WindowedSearchDriver,
};
use trailmap_search::{DEFAULT_DAYS_OFFSET, SearchQuery};

use crate::points::CsvPoints;

#[derive(Parser)]
#[command(name = "trailmap", about = "Maps of where you have been")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command. Flags override the config file.
#[derive(Args)]
struct MapArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Canvas sizing method (`extent` or `zoom`)
    #[arg(long)]
    method: Option<RenderMethod>,
    /// Colour palette (`pink` or `flickr`)
    #[arg(long)]
    palette: Option<Palette>,
    /// Zoom level for the `zoom` method (0-18)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=18))]
    zoom: Option<u8>,
    /// Draw the outlines of the places the points fall in
    #[arg(long)]
    places: bool,
    /// Comma-separated place type ids to outline (e.g., "7,22")
    #[arg(long, value_delimiter = ',')]
    valid_place_types: Vec<u32>,
}

/// Photo search filters.
#[derive(Args)]
struct SearchArgs {
    /// Results per page
    #[arg(long)]
    per_page: Option<u32>,
    /// Free text search
    #[arg(long)]
    text: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
    /// Only this user's photos
    #[arg(long)]
    user_id: Option<String>,
    /// Only photos in this place
    #[arg(long)]
    woe_id: Option<String>,
    /// With `--user-id`, include contacts' photos (`all` or `ff`)
    #[arg(long, requires = "user_id")]
    contacts: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a map from a CSV file with latitude and longitude columns
    Render {
        /// Input CSV file
        #[arg(long)]
        points: PathBuf,
        /// Output display list (JSON)
        #[arg(long)]
        output: PathBuf,
        /// Draw a marker per point
        #[arg(long)]
        draw_points: bool,
        /// Draw a line through the points in file order
        #[arg(long)]
        draw_line: bool,
        #[command(flatten)]
        map: MapArgs,
    },
    /// Render one map of every photo a Flickr search returns
    Photos {
        /// Output display list (JSON)
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        map: MapArgs,
    },
    /// Render one map per upload window of a Flickr photo search
    Search {
        /// First day of the first window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Number of days to cover
        #[arg(long)]
        days_total: u32,
        /// Days per window
        #[arg(long, default_value_t = DEFAULT_DAYS_OFFSET)]
        days_offset: u32,
        /// Map each window on its own instead of accumulating photos
        #[arg(long)]
        replace: bool,
        #[command(flatten)]
        search: SearchArgs,
        /// Directory for the display lists
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// File name prefix; files are named `<prefix>_<window start>.json`
        #[arg(long, default_value = "trailmap")]
        prefix: String,
        #[command(flatten)]
        map: MapArgs,
    },
}

impl SearchArgs {
    fn query(self) -> SearchQuery {
        SearchQuery {
            text: self.text,
            tags: self.tags,
            user_id: self.user_id,
            woe_id: self.woe_id,
            contacts: self.contacts,
            ..SearchQuery::default()
        }
    }
}

impl MapArgs {
    fn load(&self) -> Result<MapConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load(path)?,
            None => MapConfig::default(),
        };
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(palette) = self.palette {
            config.palette = palette;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        if self.places {
            config.draw_place_outlines = true;
        }
        if !self.valid_place_types.is_empty() {
            config.valid_place_types = self.valid_place_types.iter().copied().collect::<BTreeSet<_>>();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = trailmap_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            points,
            output,
            draw_points,
            draw_line,
            map,
        } => {
            let config = map.load()?;
            let points = CsvPoints::new(points).points()?;
            log::info!("Read {} points", points.len());

            let services = MapServices::from_env(&config)?
                .with_progress(IndicatifProgress::lookups_bar(&multi, "Looking up"));
            let mut session = MapSession::new(&services, &config);

            let canvas = session
                .render(
                    &mut DisplayListPainter,
                    &points,
                    RenderOptions {
                        draw_points,
                        draw_points_as_line: draw_line,
                    },
                )
                .await?;

            write_display_list(&output, &canvas)?;
            log::info!(
                "Wrote {}x{} map with {} layers to {}",
                canvas.width,
                canvas.height,
                canvas.layers.len(),
                output.display()
            );
        }
        Commands::Photos {
            output,
            search,
            map,
        } => {
            let config = map.load()?;
            let services = MapServices::from_env(&config)?
                .with_progress(IndicatifProgress::lookups_bar(&multi, "Looking up"));

            let mut photo_map = PhotoMap::new(Arc::new(flickr_photo_search()?), services, config);
            if let Some(per_page) = search.per_page {
                photo_map = photo_map.per_page(per_page);
            }

            let canvas = photo_map
                .render(&mut DisplayListPainter, &search.query())
                .await?;

            write_display_list(&output, &canvas)?;
            println!("{}", output.display());
        }
        Commands::Search {
            start,
            days_total,
            days_offset,
            replace,
            search,
            output_dir,
            prefix,
            map,
        } => {
            let config = map.load()?;
            let services = MapServices::from_env(&config)?
                .with_progress(IndicatifProgress::lookups_bar(&multi, "Looking up"));

            let mut driver =
                WindowedSearchDriver::new(Arc::new(flickr_photo_search()?), services, config)
                    .collect(!replace);
            if let Some(per_page) = search.per_page {
                driver = driver.per_page(per_page);
            }
            let query = search.query();

            let images = driver
                .run(
                    &mut DisplayListPainter,
                    &query,
                    start,
                    days_total,
                    days_offset,
                    Utc::now(),
                )
                .await?;

            for image in &images {
                let path = output_dir.join(format!("{prefix}_{}.json", image.window.start.timestamp()));
                write_display_list(&path, &image.canvas)?;
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn write_display_list(path: &Path, canvas: &DisplayList) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), canvas)?;
    log::debug!("Saved {}", path.display());
    Ok(())
}
