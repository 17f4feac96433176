//! Lambert Conformal Conic projection (two standard parallels, ellipsoidal).
//!
//! Used by the Canada Atlas Lambert system (EPSG:3978). The projection maps
//! a cone secant to the ellipsoid along both standard parallels onto a plane.
//!
//! The projection parameters include:
//! - Latitude of false origin (lat0)
//! - Longitude of false origin (lon0), the central meridian
//! - Standard parallels lat1 and lat2
//! - False easting and northing

use crate::ellipsoid::{adjust_lon, msfn, phi_from_ts, tsfn, Ellipsoid};
use crate::Projection;
use tcrs_common::{LatLng, Vector2};

/// Lambert Conformal Conic projection with precomputed cone constants.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    ellipsoid: Ellipsoid,
    /// Central meridian in radians
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Cone constant (n)
    n: f64,
    /// a * F
    af: f64,
    /// Radius at the latitude of false origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from parameters in degrees and metres.
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.e();
        let e2 = ellipsoid.e2();
        let lat0 = lat0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();

        let m1 = msfn(lat1, e2);
        let t1 = tsfn(lat1, e);

        // Cone constant n
        let n = if (lat1 - lat2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            lat1.sin()
        } else {
            let m2 = msfn(lat2, e2);
            let t2 = tsfn(lat2, e);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };

        let af = ellipsoid.a * m1 / (n * t1.powf(n));
        let rho0 = af * tsfn(lat0, e).powf(n);

        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            false_easting,
            false_northing,
            n,
            af,
            rho0,
        }
    }

    /// Canada Atlas Lambert (EPSG:3978) on GRS80.
    ///
    /// - Origin: 49°N, 95°W
    /// - Standard parallels: 49°N and 77°N
    /// - No false easting or northing
    pub fn canada_atlas() -> Self {
        Self::new(Ellipsoid::GRS80, 49.0, -95.0, 49.0, 77.0, 0.0, 0.0)
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

impl Projection for LambertConformal {
    fn forward(&self, latlng: LatLng) -> Vector2 {
        let e = self.ellipsoid.e();
        let lat = latlng.lat.to_radians();
        let dlon = adjust_lon(latlng.lng.to_radians() - self.lon0);

        let rho = self.af * tsfn(lat, e).powf(self.n);
        let theta = self.n * dlon;

        Vector2::new(
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        )
    }

    fn inverse(&self, point: Vector2) -> LatLng {
        let e = self.ellipsoid.e();
        let sign = self.n.signum();
        let dx = point.x - self.false_easting;
        let dy = self.rho0 - (point.y - self.false_northing);

        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);
        let t = (rho / self.af).powf(1.0 / self.n);

        let lat = phi_from_ts(t, e);
        let lon = adjust_lon(theta / self.n + self.lon0);
        LatLng::new(lat.to_degrees(), lon.to_degrees())
    }

    fn accepts(&self, latlng: LatLng) -> bool {
        // The apex of a northern cone is the north pole; the south pole is at infinity.
        latlng.lat > -90.0
    }
}
