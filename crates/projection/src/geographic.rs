//! Plate carrée: geographic coordinates used directly as projected units.

use crate::Projection;
use tcrs_common::{LatLng, Vector2};

/// Longitude on x and latitude on y, in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl Projection for Geographic {
    fn forward(&self, latlng: LatLng) -> Vector2 {
        latlng.to_lon_lat()
    }

    fn inverse(&self, point: Vector2) -> LatLng {
        LatLng::from_lon_lat(point)
    }
}
