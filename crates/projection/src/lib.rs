//! Geodetic projections between geographic and projected coordinates.
//!
//! Implements the projections of the built-in tiled coordinate systems from
//! scratch, behind the narrow [`GeodeticProjection`] trait the tiling engine
//! consumes.

pub mod ellipsoid;
pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod polar;

pub use geographic::Geographic;
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use polar::PolarStereographic;

use once_cell::sync::Lazy;
use tcrs_common::{CrsCode, LatLng, ProjectionError, Vector2};
use tracing::trace;

/// Projection service consumed by the tiling engine.
///
/// `code` is any spelling of a coordinate system identifier accepted by
/// [`CrsCode::parse`].
pub trait GeodeticProjection: Send + Sync {
    /// Geographic to projected units.
    fn project(&self, code: &str, latlng: LatLng) -> Result<Vector2, ProjectionError>;

    /// Projected units to geographic.
    fn unproject(&self, code: &str, point: Vector2) -> Result<LatLng, ProjectionError>;
}

/// The math of a single map projection.
pub trait Projection: Send + Sync {
    fn forward(&self, latlng: LatLng) -> Vector2;

    fn inverse(&self, point: Vector2) -> LatLng;

    /// Whether `latlng` (already known to be in range) can be projected.
    fn accepts(&self, _latlng: LatLng) -> bool {
        true
    }
}

static CANADA_ATLAS: Lazy<LambertConformal> = Lazy::new(LambertConformal::canada_atlas);
static ARCTIC: Lazy<PolarStereographic> = Lazy::new(PolarStereographic::arctic);

/// [`GeodeticProjection`] over the projections implemented in this crate:
/// CRS:84 (and EPSG:4326), EPSG:3857, EPSG:3978 and EPSG:5936.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinProjection;

impl BuiltinProjection {
    pub fn new() -> Self {
        Self
    }

    /// Look up the projection for a coordinate system identifier.
    pub fn projection_for(&self, code: &str) -> Result<&'static dyn Projection, ProjectionError> {
        let crs =
            CrsCode::parse(code).ok_or_else(|| ProjectionError::UnsupportedCrs(code.to_string()))?;
        match crs {
            CrsCode::Crs84 => Ok(&Geographic),
            CrsCode::Epsg(3857) => Ok(&WebMercator),
            CrsCode::Epsg(3978) => Ok(&*CANADA_ATLAS),
            CrsCode::Epsg(5936) => Ok(&*ARCTIC),
            _ => Err(ProjectionError::UnsupportedCrs(code.to_string())),
        }
    }

    /// Whether `code` names a supported coordinate system.
    pub fn supports(&self, code: &str) -> bool {
        self.projection_for(code).is_ok()
    }
}

impl GeodeticProjection for BuiltinProjection {
    fn project(&self, code: &str, latlng: LatLng) -> Result<Vector2, ProjectionError> {
        let projection = self.projection_for(code)?;
        if !latlng.is_valid() || !projection.accepts(latlng) {
            return Err(ProjectionError::OutOfDomain {
                code: code.to_string(),
                lat: latlng.lat,
                lng: latlng.lng,
            });
        }

        let point = projection.forward(latlng);
        if !point.is_finite() {
            return Err(ProjectionError::TransformFailed(format!(
                "{} produced {} for lat={}, lng={}",
                code, point, latlng.lat, latlng.lng
            )));
        }
        trace!(code, lat = latlng.lat, lng = latlng.lng, x = point.x, y = point.y, "Projected");
        Ok(point)
    }

    fn unproject(&self, code: &str, point: Vector2) -> Result<LatLng, ProjectionError> {
        let projection = self.projection_for(code)?;
        let latlng = projection.inverse(point);
        if !latlng.lat.is_finite() || !latlng.lng.is_finite() {
            return Err(ProjectionError::TransformFailed(format!(
                "{} could not invert {}",
                code, point
            )));
        }
        Ok(latlng)
    }
}
