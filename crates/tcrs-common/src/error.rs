//! Error types for the tiled CRS crates.

use crate::bbox::BboxParseError;
use thiserror::Error;

/// Result type alias using TcrsError.
pub type TcrsResult<T> = Result<T, TcrsError>;

/// Failure reported by a geodetic projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Coordinate outside the domain of {code}: lat={lat}, lng={lng}")]
    OutOfDomain { code: String, lat: f64, lng: f64 },

    #[error("Transform failed: {0}")]
    TransformFailed(String),
}

/// Primary error type for pyramid lookups and coordinate operations.
#[derive(Debug, Error)]
pub enum TcrsError {
    // === Configuration Errors ===
    #[error("Tiled CRS definition not found: {0}")]
    PyramidNotFound(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(#[from] BboxParseError),

    #[error("Invalid pyramid definition: {0}")]
    InvalidDefinition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // === Projection Errors ===
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    // === Argument Errors ===
    #[error("Zoom level {zoom} out of range (pyramid has {max_zoom} levels)")]
    ZoomOutOfRange { zoom: i32, max_zoom: usize },
}

/// Coarse classification used by callers deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown pyramid, malformed bounds or a bad definition; aborts the request.
    Configuration,
    /// The projection could not handle a coordinate.
    Projection,
    /// The caller asked for something the pyramid does not have.
    InvalidArgument,
}

impl TcrsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TcrsError::PyramidNotFound(_)
            | TcrsError::InvalidBounds(_)
            | TcrsError::InvalidDefinition(_)
            | TcrsError::Config(_) => ErrorKind::Configuration,

            TcrsError::Projection(_) => ErrorKind::Projection,

            TcrsError::ZoomOutOfRange { .. } => ErrorKind::InvalidArgument,
        }
    }
}
