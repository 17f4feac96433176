//! Coordinate Reference System codes and their textual aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

const EPSG_PREFIXES: &[&str] = &[
    "URN:OGC:DEF:CRS:EPSG::",
    "URN:OGC:DEF:CRS:EPSG:",
    "URN:X-OGC:DEF:CRS:EPSG:",
    "HTTP://WWW.OPENGIS.NET/DEF/CRS/EPSG/0/",
    "EPSG:",
];

const CRS84_ALIASES: &[&str] = &[
    "CRS:84",
    "OGC:CRS84",
    "URN:OGC:DEF:CRS:OGC:1.3:CRS84",
    "URN:OGC:DEF:CRS:OGC::CRS84",
    "HTTP://WWW.OPENGIS.NET/DEF/CRS/OGC/1.3/CRS84",
];

/// A normalised coordinate reference system identifier.
///
/// Geographic WGS84 is always normalised to [`CrsCode::Crs84`] (longitude
/// first), including when it is spelled `EPSG:4326`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic, lon/lat in degrees
    Crs84,
    /// Any other EPSG registered system
    Epsg(u32),
}

impl CrsCode {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:3857"
    /// - "urn:ogc:def:crs:EPSG::3857"
    /// - "urn:x-ogc:def:crs:EPSG:3857"
    /// - "http://www.opengis.net/def/crs/EPSG/0/3857"
    /// - "CRS:84", "urn:ogc:def:crs:OGC:1.3:CRS84"
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();

        if CRS84_ALIASES.contains(&normalized.as_str()) {
            return Some(CrsCode::Crs84);
        }

        let number = EPSG_PREFIXES
            .iter()
            .find_map(|prefix| normalized.strip_prefix(prefix))?;
        match number.parse::<u32>().ok()? {
            4326 => Some(CrsCode::Crs84),
            n => Some(CrsCode::Epsg(n)),
        }
    }

    /// The `EPSG:n` code handed to output formats.
    pub fn output_code(&self) -> String {
        match self {
            CrsCode::Crs84 => "EPSG:4326".to_string(),
            CrsCode::Epsg(n) => format!("EPSG:{}", n),
        }
    }

    /// The OGC URN spelling, e.g. `urn:ogc:def:crs:EPSG::3857`.
    pub fn to_ogc_urn(&self) -> String {
        match self {
            CrsCode::Crs84 => "urn:ogc:def:crs:OGC:1.3:CRS84".to_string(),
            CrsCode::Epsg(n) => format!("urn:ogc:def:crs:EPSG::{}", n),
        }
    }

    /// Every upper-cased spelling that [`CrsCode::parse`] maps to this code.
    ///
    /// The `http://` spelling is omitted.
    pub fn aliases(&self) -> Vec<String> {
        match self {
            CrsCode::Crs84 => {
                let mut aliases: Vec<String> =
                    CRS84_ALIASES.iter().map(|a| a.to_string()).collect();
                aliases.pop();
                aliases.push("EPSG:4326".to_string());
                aliases.push("URN:OGC:DEF:CRS:EPSG::4326".to_string());
                aliases
            }
            CrsCode::Epsg(n) => EPSG_PREFIXES[..4]
                .iter()
                .filter(|p| !p.starts_with("HTTP"))
                .map(|p| format!("{}{}", p, n))
                .chain(std::iter::once(format!("EPSG:{}", n)))
                .collect(),
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Crs84)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Crs84 => write!(f, "CRS:84"),
            CrsCode::Epsg(n) => write!(f, "EPSG:{}", n),
        }
    }
}
