//! Common test fixtures for tiled CRS tests.

/// Extents expressed as (west, south, east, north).
pub mod bbox {
    /// Whole world in degrees
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Ottawa area in degrees
    pub const OTTAWA: (f64, f64, f64, f64) = (-76.0, 45.0, -75.0, 46.0);

    /// Continental Canada in degrees
    pub const CANADA: (f64, f64, f64, f64) = (-141.0, 41.7, -52.6, 83.1);

    /// Single point (degenerate extent)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}

/// Display sizes in pixels as (width, height).
pub mod display {
    pub const SINGLE_TILE: (f64, f64) = (256.0, 256.0);
    pub const EMPTY: (f64, f64) = (0.0, 0.0);
}

/// Reference points as (lat, lng) in degrees.
pub mod places {
    pub const OTTAWA: (f64, f64) = (45.4215, -75.6972);
    pub const RESOLUTE: (f64, f64) = (74.6973, -94.8297);
    pub const NORTH_POLE: (f64, f64) = (90.0, 0.0);
}
