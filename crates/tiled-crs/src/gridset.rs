//! Grid sets: externally configured tile matrices turned into pyramids.
//!
//! A grid set names its levels. Levels that are plain numbers or share a
//! common non-numeric prefix (e.g. `EPSG:2056:0`, `EPSG:2056:1`) can be
//! addressed as zoom levels; anything else cannot be exposed as a pyramid.

use crate::pyramid::PyramidDefinition;
use crate::registry::FIXED_NAMES;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tcrs_common::{BoundingBox, TcrsError, TcrsResult, Vector2};

static NUMERIC_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric level pattern"));
static DIGITS_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("digits pattern"));

/// How the levels of a grid set are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelNaming {
    /// Every level is a number.
    Numeric,
    /// Every level starts with this prefix.
    Prefixed(String),
    /// The levels share no prefix.
    Unprefixed,
}

/// Classify a list of level names.
///
/// Returns `None` for an empty list and for levels whose only common prefix
/// is made of digits.
pub fn level_naming<S: AsRef<str>>(levels: &[S]) -> Option<LevelNaming> {
    let first = levels.first()?.as_ref();

    if levels.iter().all(|l| NUMERIC_LEVEL.is_match(l.as_ref())) {
        return Some(LevelNaming::Numeric);
    }

    let mut prefix = first;
    for level in &levels[1..] {
        let level = level.as_ref();
        while !level.starts_with(prefix) {
            let mut chars = prefix.chars();
            chars.next_back();
            prefix = chars.as_str();
            if prefix.is_empty() {
                return Some(LevelNaming::Unprefixed);
            }
        }
    }

    if DIGITS_ONLY.is_match(prefix) {
        return None;
    }
    Some(LevelNaming::Prefixed(prefix.to_string()))
}

fn default_meters_per_unit() -> f64 {
    1.0
}

fn default_pixel_size() -> f64 {
    0.00028
}

fn default_tile_size() -> u32 {
    256
}

/// A grid set as described in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSetConfig {
    pub name: String,
    /// Coordinate system identifier, e.g. `EPSG:2056`
    pub srs: String,
    /// `[minx, miny, maxx, maxy]` in projected units
    pub extent: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_denominators: Option<Vec<f64>>,
    #[serde(default = "default_meters_per_unit")]
    pub meters_per_unit: f64,
    /// Pixel size in metres used with scale denominators
    #[serde(default = "default_pixel_size")]
    pub pixel_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_names: Option<Vec<String>>,
    #[serde(default = "default_tile_size")]
    pub tile_width: u32,
    #[serde(default = "default_tile_size")]
    pub tile_height: u32,
}

impl GridSetConfig {
    /// Number of levels, from whichever list is configured.
    pub fn level_count(&self) -> usize {
        self.resolutions
            .as_ref()
            .or(self.scale_denominators.as_ref())
            .map_or(0, Vec::len)
    }

    /// Configured level names, or `<name>:<index>` for each level.
    pub fn level_names(&self) -> Vec<String> {
        match &self.scale_names {
            Some(names) => names.clone(),
            None => (0..self.level_count())
                .map(|i| format!("{}:{}", self.name, i))
                .collect(),
        }
    }

    pub fn level_naming(&self) -> Option<LevelNaming> {
        level_naming(&self.level_names())
    }

    /// Whether this grid set can be exposed as a pyramid.
    ///
    /// The built-in names are reserved, names containing `:` are rejected,
    /// and the levels must be numeric or share a prefix.
    pub fn is_supported(&self) -> bool {
        if FIXED_NAMES.contains(&self.name.as_str()) || self.name.contains(':') {
            return false;
        }
        matches!(
            self.level_naming(),
            Some(LevelNaming::Numeric) | Some(LevelNaming::Prefixed(_))
        )
    }

    /// Projected units per pixel for each level.
    pub fn resolutions(&self) -> TcrsResult<Vec<f64>> {
        let resolutions = match (&self.resolutions, &self.scale_denominators) {
            (Some(resolutions), _) => resolutions.clone(),
            (None, Some(denominators)) => {
                if !(self.meters_per_unit > 0.0) {
                    return Err(TcrsError::InvalidDefinition(format!(
                        "grid set {} has invalid meters_per_unit {}",
                        self.name, self.meters_per_unit
                    )));
                }
                denominators
                    .iter()
                    .map(|d| d * self.pixel_size / self.meters_per_unit)
                    .collect()
            }
            (None, None) => {
                return Err(TcrsError::InvalidDefinition(format!(
                    "grid set {} has neither resolutions nor scale_denominators",
                    self.name
                )))
            }
        };

        if let Some(bad) = resolutions.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(TcrsError::InvalidDefinition(format!(
                "grid set {} has a non-positive resolution {}",
                self.name, bad
            )));
        }
        Ok(resolutions)
    }

    /// Convert into a pyramid: origin at the top-left of the extent,
    /// scale = 1 / resolution.
    pub fn to_pyramid_definition(&self) -> TcrsResult<PyramidDefinition> {
        if self.tile_width != self.tile_height {
            return Err(TcrsError::InvalidDefinition(format!(
                "grid set {} has non-square tiles {}x{}",
                self.name, self.tile_width, self.tile_height
            )));
        }

        let [minx, miny, maxx, maxy] = self.extent;
        let bounds = BoundingBox::from_coords(minx, miny, maxx, maxy);
        let origin = Vector2::new(bounds.min().x, bounds.max().y);
        let scales = self.resolutions()?.iter().map(|r| 1.0 / r).collect();

        PyramidDefinition::new(
            self.name.clone(),
            self.srs.clone(),
            bounds,
            self.tile_width,
            origin,
            scales,
        )
    }
}
