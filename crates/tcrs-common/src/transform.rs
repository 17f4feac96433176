//! Affine scaling between projected units and pixel units.

use crate::point::Vector2;
use serde::{Deserialize, Serialize};

/// A four coefficient affine transform applied together with a per-call scale.
///
/// `transform(p, s) = (s * (a * p.x + b), s * (c * p.y + d))`
///
/// A scale of exactly zero is treated as one, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineScaleTransform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl AffineScaleTransform {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// The transform that puts `origin` at pixel (0, 0) with x growing to the
    /// right and y growing downwards.
    pub fn for_origin(origin: Vector2) -> Self {
        Self::new(1.0, -origin.x, -1.0, origin.y)
    }

    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Projected units to pixel units.
    pub fn transform(&self, p: Vector2, scale: f64) -> Vector2 {
        let scale = non_zero(scale);
        Vector2::new(
            scale * (self.a * p.x + self.b),
            scale * (self.c * p.y + self.d),
        )
    }

    /// Pixel units back to projected units.
    pub fn untransform(&self, p: Vector2, scale: f64) -> Vector2 {
        let scale = non_zero(scale);
        Vector2::new(
            (p.x / scale - self.b) / self.a,
            (p.y / scale - self.d) / self.c,
        )
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}
