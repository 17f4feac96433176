//! Polar stereographic projection (variant A, north pole).
//!
//! Used by the Arctic Polar Stereographic system (EPSG:5936).

use crate::ellipsoid::{adjust_lon, phi_from_ts, tsfn, Ellipsoid};
use crate::Projection;
use tcrs_common::{LatLng, Vector2};

#[derive(Debug, Clone)]
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    /// Longitude of origin in radians
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    /// 2 a k0 / sqrt((1+e)^(1+e) (1-e)^(1-e))
    rho_factor: f64,
}

impl PolarStereographic {
    pub fn north(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        scale_factor: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.e();
        let denom = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            false_easting,
            false_northing,
            rho_factor: 2.0 * ellipsoid.a * scale_factor / denom,
        }
    }

    /// EPSG:5936, WGS 84 / EPSG Alaska Polar Stereographic.
    pub fn arctic() -> Self {
        Self::north(Ellipsoid::WGS84, -150.0, 0.994, 2_000_000.0, 2_000_000.0)
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, latlng: LatLng) -> Vector2 {
        let t = tsfn(latlng.lat.to_radians(), self.ellipsoid.e());
        let rho = self.rho_factor * t;
        let dlon = adjust_lon(latlng.lng.to_radians() - self.lon0);
        Vector2::new(
            self.false_easting + rho * dlon.sin(),
            self.false_northing - rho * dlon.cos(),
        )
    }

    fn inverse(&self, point: Vector2) -> LatLng {
        let dx = point.x - self.false_easting;
        let dy = point.y - self.false_northing;
        let rho = (dx * dx + dy * dy).sqrt();
        let t = rho / self.rho_factor;
        let lat = phi_from_ts(t, self.ellipsoid.e());
        let lon = if rho == 0.0 {
            self.lon0
        } else {
            adjust_lon(self.lon0 + dx.atan2(-dy))
        };
        LatLng::new(lat.to_degrees(), lon.to_degrees())
    }

    fn accepts(&self, latlng: LatLng) -> bool {
        latlng.lat > -90.0
    }
}
