//! Tile grid addresses.
//!
//! Tile (0, 0) is the upper-left tile of a pyramid level; x grows to the
//! right and y grows downwards.

use crate::point::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tile coordinate (zoom/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAddress {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
    /// Zoom level (index into the pyramid's scale table)
    pub zoom: i32,
}

impl TileAddress {
    pub fn new(x: i64, y: i64, zoom: i32) -> Self {
        Self { x, y, zoom }
    }

    /// Centre of the tile in tile-space units.
    pub fn centre(&self) -> Vector2 {
        Vector2::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// Upper-left corner of the tile in tile-space units.
    pub fn corner(&self) -> Vector2 {
        Vector2::new(self.x as f64, self.y as f64)
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
