//! Bounding box types and operations.

use crate::point::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An axis-aligned rectangle in projected, pixel or tile units.
///
/// The box is only ever built by accumulating points, so `min <= max` holds
/// component-wise at all times. Building from two points keeps their
/// component-wise extremes, not the points themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBounds")]
pub struct BoundingBox {
    min: Vector2,
    max: Vector2,
}

#[derive(Deserialize)]
struct RawBounds {
    min: Vector2,
    max: Vector2,
}

impl From<RawBounds> for BoundingBox {
    fn from(raw: RawBounds) -> Self {
        BoundingBox::new(raw.min, raw.max)
    }
}

impl BoundingBox {
    /// Create the smallest box holding both points.
    pub fn new(a: Vector2, b: Vector2) -> Self {
        let mut bbox = Self::from_point(a);
        bbox.extend(b);
        bbox
    }

    /// A degenerate box covering a single point.
    pub fn from_point(p: Vector2) -> Self {
        Self { min: p, max: p }
    }

    /// Accumulate any number of points; `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector2>,
    {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next()?);
        for p in iter {
            bbox.extend(p);
        }
        Some(bbox)
    }

    /// Create a box from corner ordinates, in any order.
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Vector2::new(x1, y1), Vector2::new(x2, y2))
    }

    /// Parse a bounds string: "west,south,east,north".
    ///
    /// Exactly four comma separated numbers are required. Surrounding
    /// whitespace around each ordinate is ignored.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut ordinates = [0.0; 4];
        for (slot, part) in ordinates.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let [west, south, east, north] = ordinates;
        Ok(Self::from_coords(west, south, east, north))
    }

    /// Widen the box so it includes `p`.
    pub fn extend(&mut self, p: Vector2) {
        self.min = Vector2::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Vector2::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    /// Copying variant of [`BoundingBox::extend`].
    pub fn extended(mut self, p: Vector2) -> Self {
        self.extend(p);
        self
    }

    pub fn min(&self) -> Vector2 {
        self.min
    }

    pub fn max(&self) -> Vector2 {
        self.max
    }

    /// Midpoint of the box.
    pub fn centre(&self) -> Vector2 {
        Vector2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// Closed-interval overlap test: boxes that share only an edge intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        other.max.x >= self.min.x
            && other.min.x <= self.max.x
            && other.max.y >= self.min.y
            && other.min.y <= self.max.y
    }

    /// Non-strict containment of another box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Apply `f` to both corners and rebuild the box from the results.
    pub fn map_corners<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Vector2) -> Vector2,
    {
        Self::new(f(self.min), f(self.max))
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounds format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bounds: {0}")]
    InvalidNumber(String),
}
