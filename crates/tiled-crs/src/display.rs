//! Named display sizes used when fitting an extent to a viewport.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tcrs_common::{BoundingBox, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayPreset {
    PhonePortrait,
    PhoneLandscape,
    TabletPortrait,
    TabletLandscape,
    DesktopPortrait,
    DesktopLandscape,
}

impl DisplayPreset {
    pub const ALL: [DisplayPreset; 6] = [
        DisplayPreset::PhonePortrait,
        DisplayPreset::PhoneLandscape,
        DisplayPreset::TabletPortrait,
        DisplayPreset::TabletLandscape,
        DisplayPreset::DesktopPortrait,
        DisplayPreset::DesktopLandscape,
    ];

    /// Width and height in pixels.
    ///
    /// The desktop pair keeps its historical orientation: "portrait" is the
    /// wide one.
    pub fn size(&self) -> (u32, u32) {
        match self {
            DisplayPreset::PhonePortrait => (300, 812),
            DisplayPreset::PhoneLandscape => (812, 300),
            DisplayPreset::TabletPortrait => (760, 1024),
            DisplayPreset::TabletLandscape => (1024, 760),
            DisplayPreset::DesktopPortrait => (1024, 768),
            DisplayPreset::DesktopLandscape => (768, 1024),
        }
    }

    /// Pixel bounds `(0, 0)-(width, height)`.
    pub fn bounds(&self) -> BoundingBox {
        let (w, h) = self.size();
        BoundingBox::new(Vector2::new(0.0, 0.0), Vector2::new(w as f64, h as f64))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DisplayPreset::PhonePortrait => "phone-portrait",
            DisplayPreset::PhoneLandscape => "phone-landscape",
            DisplayPreset::TabletPortrait => "tablet-portrait",
            DisplayPreset::TabletLandscape => "tablet-landscape",
            DisplayPreset::DesktopPortrait => "desktop-portrait",
            DisplayPreset::DesktopLandscape => "desktop-landscape",
        }
    }
}

impl fmt::Display for DisplayPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        DisplayPreset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| format!("Unknown display preset: {}", s))
    }
}

/// Parse a display as a preset name or as `WIDTHxHEIGHT` pixels.
pub fn parse_display(s: &str) -> Option<BoundingBox> {
    if let Ok(preset) = s.parse::<DisplayPreset>() {
        return Some(preset.bounds());
    }
    let (w, h) = s.trim().to_lowercase().split_once('x').map(|(w, h)| {
        (w.trim().parse::<u32>(), h.trim().parse::<u32>())
    })?;
    Some(BoundingBox::new(
        Vector2::new(0.0, 0.0),
        Vector2::new(w.ok()? as f64, h.ok()? as f64),
    ))
}
