//! Tile pyramid definitions and the built-in pyramids.
//!
//! A pyramid fixes a projected coordinate system, its bounds, a square tile
//! size, the projected point that maps to pixel (0, 0), and one scale
//! (pixels per projected unit) per zoom level.

use projection::WebMercator;
use serde::Serialize;
use tcrs_common::{AffineScaleTransform, BoundingBox, TcrsError, TcrsResult, Vector2};

/// Tile edge length in pixels shared by the built-in pyramids.
pub const TILE_SIZE: u32 = 256;

/// Immutable description of one tile pyramid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidDefinition {
    name: String,
    code: String,
    bounds: BoundingBox,
    tile_size: u32,
    origin: Vector2,
    scales: Vec<f64>,
}

impl PyramidDefinition {
    /// Create and validate a definition.
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` when the name or code is blank, the tile size is
    /// zero, the origin or bounds are not finite, or any scale is not a
    /// finite positive number.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        bounds: BoundingBox,
        tile_size: u32,
        origin: Vector2,
        scales: Vec<f64>,
    ) -> TcrsResult<Self> {
        let name = name.into();
        let code = code.into();

        if name.trim().is_empty() {
            return Err(TcrsError::InvalidDefinition("pyramid name is empty".into()));
        }
        if code.trim().is_empty() {
            return Err(TcrsError::InvalidDefinition(format!(
                "pyramid {} has no coordinate system code",
                name
            )));
        }
        if tile_size == 0 {
            return Err(TcrsError::InvalidDefinition(format!(
                "pyramid {} has a zero tile size",
                name
            )));
        }
        if !origin.is_finite() || !bounds.min().is_finite() || !bounds.max().is_finite() {
            return Err(TcrsError::InvalidDefinition(format!(
                "pyramid {} has non-finite bounds or origin",
                name
            )));
        }
        if scales.is_empty() {
            return Err(TcrsError::InvalidDefinition(format!(
                "pyramid {} has no zoom levels",
                name
            )));
        }
        if let Some(zoom) = scales.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(TcrsError::InvalidDefinition(format!(
                "pyramid {} has an invalid scale at zoom {}: {}",
                name, zoom, scales[zoom]
            )));
        }

        Ok(Self {
            name,
            code,
            bounds,
            tile_size,
            origin,
            scales,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coordinate system identifier as configured.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Projected (untransformed) bounds.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn origin(&self) -> Vector2 {
        self.origin
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of zoom levels.
    pub fn max_zoom(&self) -> usize {
        self.scales.len()
    }

    /// Pixels per projected unit at `zoom`.
    pub fn scale(&self, zoom: i32) -> TcrsResult<f64> {
        usize::try_from(zoom)
            .ok()
            .and_then(|z| self.scales.get(z).copied())
            .ok_or(TcrsError::ZoomOutOfRange {
                zoom,
                max_zoom: self.scales.len(),
            })
    }

    /// Projected units per pixel at `zoom`.
    pub fn resolution(&self, zoom: i32) -> TcrsResult<f64> {
        self.scale(zoom).map(|s| 1.0 / s)
    }

    /// Affine transform placing the origin at pixel (0, 0), y down.
    pub fn transformation(&self) -> AffineScaleTransform {
        AffineScaleTransform::for_origin(self.origin)
    }
}

/// Literal definition whose tables are fixed at compile time.
fn builtin(
    name: &str,
    code: &str,
    bounds: BoundingBox,
    origin: Vector2,
    resolutions: &[f64],
) -> PyramidDefinition {
    PyramidDefinition {
        name: name.to_string(),
        code: code.to_string(),
        bounds,
        tile_size: TILE_SIZE,
        origin,
        scales: resolutions.iter().map(|r| 1.0 / r).collect(),
    }
}

const WGS84_RESOLUTIONS: [f64; 22] = [
    0.703125,
    0.3515625,
    0.17578125,
    0.087890625,
    0.0439453125,
    0.02197265625,
    0.010986328125,
    0.0054931640625,
    0.00274658203125,
    0.001373291015625,
    0.0006866455078125,
    0.0003433227539062,
    0.0001716613769531,
    0.0000858306884766,
    0.0000429153442383,
    0.0000214576721191,
    0.0000107288360596,
    0.0000053644180298,
    0.0000026822090149,
    0.0000013411045074,
    0.0000006705522537,
    0.0000003352761269,
];

const OSMTILE_RESOLUTIONS: [f64; 19] = [
    156543.0339,
    78271.51695,
    39135.758475,
    19567.8792375,
    9783.93961875,
    4891.969809375,
    2445.9849046875,
    1222.9924523438,
    611.49622617188,
    305.74811308594,
    152.87405654297,
    76.437028271484,
    38.218514135742,
    19.109257067871,
    9.5546285339355,
    4.7773142669678,
    2.3886571334839,
    1.1943285667419,
    0.59716428337097,
];

const CBMTILE_RESOLUTIONS: [f64; 26] = [
    38364.660062653464,
    22489.62831258996,
    13229.193125052918,
    7937.5158750317505,
    4630.2175937685215,
    2645.8386250105837,
    1587.5031750063501,
    926.0435187537042,
    529.1677250021168,
    317.50063500127004,
    185.20870375074085,
    111.12522225044451,
    66.1459656252646,
    38.36466006265346,
    22.48962831258996,
    13.229193125052918,
    7.9375158750317505,
    4.6302175937685215,
    2.6458386250105836,
    1.5875031750063502,
    0.92604351875370428,
    0.52916772500211673,
    0.31750063500127002,
    0.18520870375074083,
    0.11112522225044451,
    0.066145965625264591,
];

const APSTILE_RESOLUTIONS: [f64; 20] = [
    238810.813354,
    119405.406677,
    59702.7033384999,
    29851.3516692501,
    14925.675834625,
    7462.83791731252,
    3731.41895865639,
    1865.70947932806,
    932.854739664032,
    466.427369832148,
    233.213684916074,
    116.606842458037,
    58.3034212288862,
    29.1517106145754,
    14.5758553072877,
    7.28792765351156,
    3.64396382688807,
    1.82198191331174,
    0.910990956788164,
    0.45549547826179,
];

/// Plate carrée over the whole world, 22 levels.
pub fn wgs84() -> PyramidDefinition {
    builtin(
        "WGS84",
        "urn:ogc:def:crs:OGC:1.3:CRS84",
        BoundingBox::from_coords(-180.0, -90.0, 180.0, 90.0),
        Vector2::new(-180.0, 90.0),
        &WGS84_RESOLUTIONS,
    )
}

/// Web Mercator, 19 levels.
pub fn osmtile() -> PyramidDefinition {
    builtin(
        "OSMTILE",
        "urn:x-ogc:def:crs:EPSG:3857",
        WebMercator::world_bounds(),
        Vector2::new(-20037508.342787, 20037508.342787),
        &OSMTILE_RESOLUTIONS,
    )
}

/// Canada Atlas Lambert, 26 levels.
pub fn cbmtile() -> PyramidDefinition {
    builtin(
        "CBMTILE",
        "urn:x-ogc:def:crs:EPSG:3978",
        BoundingBox::from_coords(-3.46558E7, -3.9E7, 1.0E7, 3.931E7),
        Vector2::new(-34655800.0, 39310000.0),
        &CBMTILE_RESOLUTIONS,
    )
}

/// Arctic Polar Stereographic, 20 levels.
pub fn apstile() -> PyramidDefinition {
    builtin(
        "APSTILE",
        "urn:x-ogc:def:crs:EPSG:5936",
        BoundingBox::from_coords(
            -28567784.109254867,
            -28567784.109254755,
            32567784.109255023,
            32567784.10925506,
        ),
        Vector2::new(-28567784.109255, 32567784.109255),
        &APSTILE_RESOLUTIONS,
    )
}

/// The four built-in pyramids in registration order.
pub fn builtins() -> Vec<PyramidDefinition> {
    vec![wgs84(), osmtile(), cbmtile(), apstile()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_builtin_level_counts() {
        assert_eq!(wgs84().max_zoom(), 22);
        assert_eq!(osmtile().max_zoom(), 19);
        assert_eq!(cbmtile().max_zoom(), 26);
        assert_eq!(apstile().max_zoom(), 20);
    }

    #[test]
    fn test_scale_is_reciprocal_of_resolution() {
        let def = wgs84();
        assert_eq!(def.scale(0).unwrap(), 1.0 / 0.703125);
        assert_approx_eq!(def.resolution(0).unwrap(), 0.703125, 1e-15);
        assert_eq!(osmtile().scale(18).unwrap(), 1.0 / 0.59716428337097);
    }

    #[test]
    fn test_scale_out_of_range() {
        let def = apstile();
        assert!(matches!(
            def.scale(20),
            Err(TcrsError::ZoomOutOfRange { zoom: 20, max_zoom: 20 })
        ));
        assert!(matches!(
            def.scale(-1),
            Err(TcrsError::ZoomOutOfRange { zoom: -1, .. })
        ));
    }

    #[test]
    fn test_builtins_validate() {
        for def in builtins() {
            let rebuilt = PyramidDefinition::new(
                def.name(),
                def.code(),
                def.bounds(),
                def.tile_size(),
                def.origin(),
                def.scales().to_vec(),
            )
            .unwrap();
            assert_eq!(rebuilt, def);
        }
    }

    #[test]
    fn test_osmtile_bounds_are_projected() {
        let b = osmtile().bounds();
        assert_approx_eq!(b.min().x, -20037508.342789244, 1e-6);
        assert_approx_eq!(b.max().y, 20037508.34278071, 0.001);
    }

    #[test]
    fn test_invalid_definitions() {
        let bounds = BoundingBox::from_coords(0.0, 0.0, 1.0, 1.0);
        let origin = Vector2::new(0.0, 1.0);
        assert!(PyramidDefinition::new("", "EPSG:1", bounds, 256, origin, vec![1.0]).is_err());
        assert!(PyramidDefinition::new("X", " ", bounds, 256, origin, vec![1.0]).is_err());
        assert!(PyramidDefinition::new("X", "EPSG:1", bounds, 0, origin, vec![1.0]).is_err());
        assert!(PyramidDefinition::new("X", "EPSG:1", bounds, 256, origin, vec![]).is_err());
        assert!(PyramidDefinition::new("X", "EPSG:1", bounds, 256, origin, vec![1.0, 0.0]).is_err());
        assert!(
            PyramidDefinition::new("X", "EPSG:1", bounds, 256, origin, vec![f64::INFINITY]).is_err()
        );
    }

    #[test]
    fn test_transformation_uses_origin() {
        let def = cbmtile();
        assert_eq!(
            def.transformation().coefficients(),
            [1.0, 34655800.0, -1.0, 39310000.0]
        );
    }
}
