//! Tile planner.
//!
//! Answers tiling questions against the built-in pyramids and any grid sets
//! found in the config directory, printing JSON on stdout.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use projection::BuiltinProjection;
use std::path::PathBuf;
use std::sync::Arc;
use tiled_crs::{load_gridsets, PyramidRegistry, DEFAULT_PAGE_SIZE};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tile-planner")]
#[command(about = "Coordinate conversion and tile enumeration for tiled CRS pyramids")]
struct Args {
    /// Directory of grid set YAML files
    #[arg(long, env = "TCRS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "TCRS_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered pyramids
    Pyramids,

    /// Convert a geographic point to pixel and tile coordinates
    Point {
        #[arg(short, long)]
        pyramid: String,

        #[arg(short, long)]
        zoom: i32,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Find the highest zoom at which bounds fit a display
    Fit {
        #[arg(short, long)]
        pyramid: String,

        /// Bounds as west,south,east,north
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: String,

        /// Bounds are longitude/latitude rather than projected units
        #[arg(long)]
        geographic: bool,

        /// Display preset name (e.g. phone-portrait) or WIDTHxHEIGHT
        #[arg(short, long, default_value = "desktop-portrait")]
        display: String,
    },

    /// List the tiles covering bounds at a zoom level, nearest to the centre first
    Tiles {
        #[arg(short, long)]
        pyramid: String,

        #[arg(short, long)]
        zoom: i32,

        /// Bounds as west,south,east,north
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: String,

        /// Bounds are longitude/latitude rather than projected units
        #[arg(long)]
        geographic: bool,

        /// Offset into the row-major tile grid
        #[arg(long, default_value = "0")]
        start: usize,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let gridsets = args
        .config_dir
        .as_deref()
        .map(load_gridsets)
        .unwrap_or_default();
    debug!(gridsets = gridsets.len(), "Loaded grid set configuration");

    let registry = PyramidRegistry::builder()
        .with_builtins()
        .with_gridsets(gridsets)
        .build()
        .context("Failed to build pyramid registry")?;
    let projection = Arc::new(BuiltinProjection::new());

    let output = match args.command {
        Command::Pyramids => commands::pyramids(&registry),
        Command::Point {
            pyramid,
            zoom,
            lat,
            lon,
        } => commands::point(&registry, projection, &pyramid, zoom, lat, lon)?,
        Command::Fit {
            pyramid,
            bbox,
            geographic,
            display,
        } => commands::fit(&registry, projection, &pyramid, &bbox, geographic, &display)?,
        Command::Tiles {
            pyramid,
            zoom,
            bbox,
            geographic,
            start,
            page_size,
        } => commands::tiles(
            &registry,
            projection,
            &pyramid,
            zoom,
            &bbox,
            geographic,
            start,
            page_size,
        )?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
