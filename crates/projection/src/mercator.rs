//! Spherical ("Web") Mercator, EPSG:3857.

use crate::Projection;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use tcrs_common::{BoundingBox, LatLng, Vector2};

/// Radius of the sphere, equal to the WGS84 semi-major axis.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude at which the projected world becomes square.
pub const MAX_LATITUDE: f64 = 85.0511287798;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Projected extent of ±180° longitude and ±[`MAX_LATITUDE`].
    pub fn world_bounds() -> BoundingBox {
        let proj = WebMercator;
        BoundingBox::new(
            proj.forward(LatLng::new(-MAX_LATITUDE, -180.0)),
            proj.forward(LatLng::new(MAX_LATITUDE, 180.0)),
        )
    }
}

impl Projection for WebMercator {
    fn forward(&self, latlng: LatLng) -> Vector2 {
        let x = EARTH_RADIUS * latlng.lng.to_radians();
        let y = EARTH_RADIUS * (FRAC_PI_4 + latlng.lat.to_radians() / 2.0).tan().ln();
        Vector2::new(x, y)
    }

    fn inverse(&self, point: Vector2) -> LatLng {
        let lng = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
        LatLng::new(lat, lng)
    }

    fn accepts(&self, latlng: LatLng) -> bool {
        latlng.lat.abs() < 90.0
    }
}
