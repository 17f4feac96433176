//! Tiled coordinate reference systems.
//!
//! A [`PyramidRegistry`] holds the known tile pyramids (the four built-ins
//! plus any configured grid sets). A [`TiledCrsEngine`] built over one of
//! them converts between geographic, projected, pixel and tile coordinates
//! and enumerates the tiles covering a viewport.
//!
//! ```ignore
//! let registry = PyramidRegistry::builder().with_builtins().build()?;
//! let engine = TiledCrsEngine::from_registry(&registry, "OSMTILE", Arc::new(BuiltinProjection::new()))?;
//! let point = engine.lat_lng_to_point(LatLng::new(45.42, -75.70), 10)?;
//! ```

pub mod config;
pub mod display;
pub mod engine;
pub mod gridset;
pub mod pyramid;
pub mod registry;

pub use config::{load_gridset_file, load_gridsets};
pub use display::{parse_display, DisplayPreset};
pub use engine::{TiledCrsEngine, DEFAULT_PAGE_SIZE};
pub use gridset::{level_naming, GridSetConfig, LevelNaming};
pub use pyramid::{PyramidDefinition, TILE_SIZE};
pub use registry::{PyramidRegistry, PyramidRegistryBuilder, FIXED_NAMES};
