//! Common types and utilities shared across the tiled CRS crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod point;
pub mod tile;
pub mod transform;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::CrsCode;
pub use error::{ErrorKind, ProjectionError, TcrsError, TcrsResult};
pub use point::{LatLng, Vector2};
pub use tile::TileAddress;
pub use transform::AffineScaleTransform;
