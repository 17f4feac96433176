//! Integration tests for TiledCrsEngine over the built-in pyramids.

use projection::{BuiltinProjection, GeodeticProjection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tcrs_common::{
    BoundingBox, ErrorKind, LatLng, ProjectionError, TcrsError, TileAddress, Vector2,
};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, fixtures};
use tiled_crs::{DisplayPreset, PyramidRegistry, TiledCrsEngine, DEFAULT_PAGE_SIZE};

fn engine(name: &str) -> TiledCrsEngine {
    let registry = PyramidRegistry::builtin();
    TiledCrsEngine::from_registry(&registry, name, Arc::new(BuiltinProjection::new())).unwrap()
}

fn bbox((w, s, e, n): (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::from_coords(w, s, e, n)
}

fn display((w, h): (f64, f64)) -> BoundingBox {
    BoundingBox::from_coords(0.0, 0.0, w, h)
}

/// Succeeds for the first `remaining` projections, then reports a domain error.
struct FailingAfter {
    remaining: AtomicUsize,
}

impl FailingAfter {
    fn new(calls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(calls),
        }
    }
}

impl GeodeticProjection for FailingAfter {
    fn project(&self, code: &str, latlng: LatLng) -> Result<Vector2, ProjectionError> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(ProjectionError::OutOfDomain {
                code: code.to_string(),
                lat: latlng.lat,
                lng: latlng.lng,
            });
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        Ok(latlng.to_lon_lat())
    }

    fn unproject(&self, _code: &str, point: Vector2) -> Result<LatLng, ProjectionError> {
        Ok(LatLng::from_lon_lat(point))
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_wgs84_zoom0_bounds() {
    let engine = engine("WGS84");
    let full = engine.definition().bounds();

    let pixels = engine.pixel_bounds_for_projected_bounds(0, &full).unwrap();
    assert_eq!(pixels, BoundingBox::from_coords(0.0, 0.0, 512.0, 256.0));

    let tiles = engine.tile_bounds_for_projected_bounds(0, &full).unwrap();
    assert_eq!(tiles, BoundingBox::from_coords(0.0, 0.0, 2.0, 1.0));
    assert_eq!(engine.max_tile_bounds(0).unwrap(), tiles);
}

#[test]
fn test_max_tile_bounds_builtins() {
    let cases = [
        ("WGS84", [(2.0, 1.0), (4.0, 2.0), (8.0, 4.0)]),
        ("OSMTILE", [(1.0, 1.0), (2.0, 2.0), (4.0, 4.0)]),
        ("CBMTILE", [(4.0, 7.0), (7.0, 13.0), (13.0, 23.0)]),
    ];
    for (name, maxima) in cases {
        let engine = engine(name);
        for (zoom, (x, y)) in maxima.into_iter().enumerate() {
            let max = engine.max_tile_bounds(zoom as i32).unwrap().max();
            assert_eq!(max, Vector2::new(x, y), "{} zoom {}", name, zoom);
        }
    }

    let aps = engine("APSTILE");
    assert_eq!(aps.max_tile_bounds(0).unwrap().max(), Vector2::new(0.0, 0.0));
    assert_eq!(aps.max_tile_bounds(1).unwrap().max(), Vector2::new(1.0, 1.0));
}

#[test]
fn test_max_zoom_per_pyramid() {
    assert_eq!(engine("WGS84").max_zoom(), 22);
    assert_eq!(engine("OSMTILE").max_zoom(), 19);
    assert_eq!(engine("CBMTILE").max_zoom(), 26);
    assert_eq!(engine("APSTILE").max_zoom(), 20);
}

#[test]
fn test_unknown_pyramid() {
    let registry = PyramidRegistry::builtin();
    let err = TiledCrsEngine::from_registry(&registry, "MARS", Arc::new(BuiltinProjection))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ============================================================================
// Point conversions
// ============================================================================

#[test]
fn test_lat_lng_to_point_wgs84() {
    let engine = engine("WGS84");
    let p = engine.lat_lng_to_point(LatLng::new(45.0, -75.0), 0).unwrap();
    assert_coords_approx_eq!((p.x, p.y), (149.333333333, 64.0), 1e-6);
}

#[test]
fn test_lat_lng_to_point_osmtile_centre() {
    let engine = engine("OSMTILE");
    let p = engine.lat_lng_to_point(LatLng::new(0.0, 0.0), 0).unwrap();
    assert_coords_approx_eq!((p.x, p.y), (128.0, 128.0), 1e-6);
}

#[test]
fn test_point_roundtrip_all_pyramids() {
    let ottawa = LatLng::new(fixtures::places::OTTAWA.0, fixtures::places::OTTAWA.1);
    for name in ["WGS84", "OSMTILE", "CBMTILE", "APSTILE"] {
        let engine = engine(name);
        for zoom in [0, 5, 12] {
            let p = engine.lat_lng_to_point(ottawa, zoom).unwrap();
            let back = engine.point_to_lat_lng(p, zoom).unwrap();
            assert_approx_eq!(back.lat, ottawa.lat, 1e-8);
            assert_approx_eq!(back.lng, ottawa.lng, 1e-8);
        }
    }
}

#[test]
fn test_projection_error_propagates() {
    let engine = engine("OSMTILE");
    let err = engine
        .lat_lng_to_point(LatLng::new(90.0, 0.0), 3)
        .unwrap_err();
    assert!(matches!(
        err,
        TcrsError::Projection(ProjectionError::OutOfDomain { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Projection);
}

#[test]
fn test_pixel_bounds_of_rounds() {
    let engine = engine("WGS84");
    // 10 / 0.703125 = 14.22, 350 / 0.703125 = 497.78
    let b = engine
        .pixel_bounds_of(&bbox((-170.0, -80.0, 170.0, 80.0)), 0)
        .unwrap();
    assert_eq!(b, BoundingBox::from_coords(14.0, 14.0, 498.0, 242.0));
}

#[test]
fn test_geographic_pixel_bounds() {
    let engine = engine("WGS84");
    let b = engine
        .geographic_pixel_bounds(&bbox(fixtures::bbox::GLOBAL), 1)
        .unwrap();
    assert_eq!(b, BoundingBox::from_coords(0.0, 0.0, 1024.0, 512.0));
}

#[test]
fn test_projected_bounds_for_display_bounds() {
    let engine = engine("WGS84");
    let b = engine
        .projected_bounds_for_display_bounds(0, Vector2::new(0.0, 0.0), &display((512.0, 256.0)))
        .unwrap();
    assert_coords_approx_eq!((b.min().x, b.min().y), (-180.0, -90.0), 1e-9);
    assert_coords_approx_eq!((b.max().x, b.max().y), (180.0, 90.0), 1e-9);
}

#[test]
fn test_projected_bounds_for_display_bounds_is_centred() {
    let engine = engine("OSMTILE");
    let centre = Vector2::new(-8_426_000.0, 5_690_000.0);
    let b = engine
        .projected_bounds_for_display_bounds(7, centre, &DisplayPreset::PhonePortrait.bounds())
        .unwrap();
    assert_coords_approx_eq!((b.centre().x, b.centre().y), (centre.x, centre.y), 1e-6);
    let resolution = engine.definition().resolution(7).unwrap();
    assert_approx_eq!(b.width(), 300.0 * resolution, 1e-6);
    assert_approx_eq!(b.height(), 812.0 * resolution, 1e-6);
}

// ============================================================================
// Fit to display
// ============================================================================

#[test]
fn test_fit_projected_bounds() {
    let engine = engine("WGS84");
    let world = engine.definition().bounds();
    assert_eq!(engine.fit_projected_bounds_to_display(&world, &display((1024.0, 768.0))), 1);
    assert_eq!(engine.fit_projected_bounds_to_display(&world, &display((768.0, 1024.0))), 0);
}

#[test]
fn test_fit_empty_display_is_minus_one() {
    let engine = engine("WGS84");
    let world = engine.definition().bounds();
    assert_eq!(
        engine.fit_projected_bounds_to_display(&world, &display(fixtures::display::EMPTY)),
        -1
    );
}

#[test]
fn test_fit_point_reaches_last_zoom() {
    let engine = engine("WGS84");
    let point = bbox(fixtures::bbox::POINT);
    assert_eq!(
        engine.fit_projected_bounds_to_display(&point, &display(fixtures::display::SINGLE_TILE)),
        21
    );
}

#[test]
fn test_fit_geographic_bounds() {
    let engine = engine("WGS84");
    let canada = bbox(fixtures::bbox::CANADA);
    assert_eq!(
        engine.fit_geographic_bounds_to_display(&canada, &DisplayPreset::DesktopPortrait.bounds()),
        3
    );
}

#[test]
fn test_fit_geographic_swallows_projection_errors() {
    // The poles are outside Web Mercator: nothing fits.
    let engine = engine("OSMTILE");
    let world = bbox(fixtures::bbox::GLOBAL);
    assert_eq!(
        engine.fit_geographic_bounds_to_display(&world, &display((1e9, 1e9))),
        -1
    );
}

#[test]
fn test_fit_geographic_returns_best_so_far() {
    let registry = PyramidRegistry::builtin();
    // Two projections per zoom: zooms 0 and 1 succeed, zoom 2 fails.
    let engine =
        TiledCrsEngine::from_registry(&registry, "WGS84", Arc::new(FailingAfter::new(4))).unwrap();
    let world = bbox(fixtures::bbox::GLOBAL);
    assert_eq!(
        engine.fit_geographic_bounds_to_display(&world, &display((1e9, 1e9))),
        1
    );
}

// ============================================================================
// Tile enumeration
// ============================================================================

fn full_zoom1_extent() -> BoundingBox {
    BoundingBox::from_coords(0.0, 0.0, 1024.0, 512.0)
}

#[test]
fn test_tiles_for_extent_clip_is_asymmetric() {
    let engine = engine("WGS84");
    let tiles = engine
        .tiles_for_extent(&full_zoom1_extent(), 1, 0, DEFAULT_PAGE_SIZE)
        .unwrap();

    // Rows 0..=2 (inclusive bound 2), columns 0..4 (exclusive bound 4)
    assert_eq!(tiles.len(), 12);
    assert!(tiles.iter().all(|t| t.y <= 2 && t.x < 4 && t.x >= 0 && t.y >= 0));
    assert!(tiles.contains(&TileAddress::new(0, 2, 1)));
    assert!(!tiles.iter().any(|t| t.x == 4));
}

#[test]
fn test_tiles_for_extent_sorted_from_centre() {
    let engine = engine("WGS84");
    let tiles = engine
        .tiles_for_extent(&full_zoom1_extent(), 1, 0, DEFAULT_PAGE_SIZE)
        .unwrap();

    assert_eq!(
        &tiles[..4],
        &[
            TileAddress::new(1, 0, 1),
            TileAddress::new(2, 0, 1),
            TileAddress::new(1, 1, 1),
            TileAddress::new(2, 1, 1),
        ]
    );

    let centre = full_zoom1_extent().centre() / 256.0;
    let distances: Vec<f64> = tiles.iter().map(|t| centre.distance_to(&t.centre())).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_tiles_for_extent_start_offset() {
    let engine = engine("WGS84");
    let extent = full_zoom1_extent();

    // Width is 5 cells: start 5 begins at row 1, column 0.
    let tiles = engine.tiles_for_extent(&extent, 1, 5, DEFAULT_PAGE_SIZE).unwrap();
    assert_eq!(tiles.len(), 8);
    assert!(tiles.iter().all(|t| t.y >= 1));

    // Start 7 begins at row 1, column 2.
    let tiles = engine.tiles_for_extent(&extent, 1, 7, DEFAULT_PAGE_SIZE).unwrap();
    assert_eq!(tiles.len(), 6);
    assert!(!tiles.contains(&TileAddress::new(1, 1, 1)));
    assert!(tiles.contains(&TileAddress::new(2, 1, 1)));
    assert!(tiles.contains(&TileAddress::new(0, 2, 1)));
}

#[test]
fn test_tiles_for_extent_page_size() {
    let engine = engine("WGS84");
    let tiles = engine.tiles_for_extent(&full_zoom1_extent(), 1, 0, 3).unwrap();
    assert_eq!(
        tiles,
        vec![
            TileAddress::new(1, 0, 1),
            TileAddress::new(2, 0, 1),
            TileAddress::new(0, 0, 1),
        ]
    );

    assert!(engine
        .tiles_for_extent(&full_zoom1_extent(), 1, 0, 0)
        .unwrap()
        .is_empty());
}

#[test]
fn test_tiles_for_extent_outside_pyramid() {
    let engine = engine("WGS84");
    let extent = BoundingBox::from_coords(-2000.0, -2000.0, -10.0, -10.0);
    assert!(engine
        .tiles_for_extent(&extent, 1, 0, DEFAULT_PAGE_SIZE)
        .unwrap()
        .is_empty());
}

#[test]
fn test_tiles_for_extent_properties() {
    let engine = engine("CBMTILE");
    let extents = [
        BoundingBox::from_coords(-300.0, -300.0, 900.0, 700.0),
        BoundingBox::from_coords(100.0, 50.0, 1900.0, 3000.0),
        BoundingBox::from_coords(0.0, 0.0, 255.0, 255.0),
    ];
    for zoom in 0..4 {
        let limit = engine.max_tile_bounds(zoom).unwrap().max();
        for extent in &extents {
            for page_size in [1, 5, DEFAULT_PAGE_SIZE] {
                let tiles = engine.tiles_for_extent(extent, zoom, 0, page_size).unwrap();
                assert!(tiles.len() <= page_size);
                for t in &tiles {
                    assert!(t.y >= 0 && t.y as f64 <= limit.y);
                    assert!(t.x >= 0 && (t.x as f64) < limit.x);
                    assert_eq!(t.zoom, zoom);
                }
                let centre = extent.centre() / 256.0;
                let distances: Vec<f64> =
                    tiles.iter().map(|t| centre.distance_to(&t.centre())).collect();
                assert!(distances.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}

#[test]
fn test_tiles_for_projected_extent_osmtile() {
    let engine = engine("OSMTILE");
    let world = engine.definition().bounds();
    let tiles = engine
        .tiles_for_projected_extent(&world, 0, 0, DEFAULT_PAGE_SIZE)
        .unwrap();
    // Stored maximum at zoom 0 is (1, 1): one column, two rows.
    assert_eq!(tiles, vec![TileAddress::new(0, 0, 0), TileAddress::new(0, 1, 0)]);
}

#[test]
fn test_tiles_for_geographic_extent() {
    let engine = engine("WGS84");
    let tiles = engine
        .tiles_for_geographic_extent(&bbox(fixtures::bbox::OTTAWA), 5, 0, DEFAULT_PAGE_SIZE)
        .unwrap();
    assert!(!tiles.is_empty());
    let ottawa = engine
        .lat_lng_to_point(LatLng::new(45.5, -75.5), 5)
        .unwrap();
    let expected = TileAddress::new((ottawa.x / 256.0) as i64, (ottawa.y / 256.0) as i64, 5);
    assert!(tiles.contains(&expected));
}

#[test]
fn test_tiles_for_geographic_extent_is_hard_error() {
    let engine = engine("OSMTILE");
    let err = engine
        .tiles_for_geographic_extent(&bbox(fixtures::bbox::GLOBAL), 2, 0, DEFAULT_PAGE_SIZE)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Projection);
}

#[test]
fn test_tiles_zoom_out_of_range() {
    let engine = engine("APSTILE");
    let err = engine
        .tiles_for_extent(&full_zoom1_extent(), 20, 0, DEFAULT_PAGE_SIZE)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_tiles_for_huge_extent_is_clipped() {
    let engine = engine("WGS84");
    let huge = BoundingBox::from_coords(-1e300, -1e300, 1e300, 1e300);
    let expected = vec![
        TileAddress::new(0, 0, 0),
        TileAddress::new(1, 0, 0),
        TileAddress::new(0, 1, 0),
        TileAddress::new(1, 1, 0),
    ];
    for start in [0, 5, usize::MAX] {
        let tiles = engine.tiles_for_extent(&huge, 0, start, 10).unwrap();
        assert_eq!(tiles, expected, "start {}", start);
    }

    let tiles = engine
        .tiles_for_projected_extent(&huge, 21, 0, 3)
        .unwrap();
    assert_eq!(tiles.len(), 3);
}

// ============================================================================
// Counting and snapping
// ============================================================================

#[test]
fn test_tile_count() {
    let engine = engine("WGS84");
    assert_eq!(engine.tile_count(1, &full_zoom1_extent()), 15);
    assert_eq!(
        engine.tile_count(3, &BoundingBox::from_coords(10.0, 10.0, 20.0, 20.0)),
        1
    );
    assert_eq!(engine.tile_count(-1, &full_zoom1_extent()), 0);
}

#[test]
fn test_tile_count_saturates() {
    let engine = engine("WGS84");
    let huge = BoundingBox::from_coords(-1e300, -1e300, 1e300, 1e300);
    assert_eq!(engine.tile_count(0, &huge), i64::MAX);
    assert_eq!(engine.tile_width(0, Some(&huge)), i64::MAX);
}

#[test]
fn test_tile_count_formula() {
    let engine = engine("OSMTILE");
    let b = BoundingBox::from_coords(-300.0, 17.0, 1300.0, 900.0);
    let expected = ((1300.0_f64 / 256.0).floor() + 1.0 - (-300.0_f64 / 256.0).floor())
        * ((900.0_f64 / 256.0).floor() + 1.0 - (17.0_f64 / 256.0).floor());
    assert_eq!(engine.tile_count(4, &b), expected as i64);
}

#[test]
fn test_tile_rounded_pixel_bounds() {
    let engine = engine("WGS84");
    let b = engine
        .tile_rounded_pixel_bounds_for_extent(&bbox((-170.0, -80.0, 170.0, 80.0)), 0)
        .unwrap();
    assert_eq!(b, BoundingBox::from_coords(0.0, 0.0, 512.0, 256.0));
}

#[test]
fn test_tile_rounded_pixel_bounds_aligned_is_unchanged() {
    let engine = engine("WGS84");
    let aligned = engine.definition().bounds();
    let pixels = engine.pixel_bounds_for_projected_bounds(0, &aligned).unwrap();
    let snapped = engine.tile_rounded_pixel_bounds_for_extent(&aligned, 0).unwrap();
    assert_eq!(snapped, pixels);

    // A single interior tile at zoom 2 (0.17578125 deg per pixel, 45 deg per tile)
    let tile = bbox((-135.0, 0.0, -90.0, 45.0));
    let snapped = engine.tile_rounded_pixel_bounds_for_extent(&tile, 2).unwrap();
    assert_eq!(snapped, BoundingBox::from_coords(256.0, 256.0, 512.0, 512.0));
}

#[test]
fn test_tile_bounds() {
    let engine = engine("WGS84");
    let tile = TileAddress::new(0, 0, 0);
    assert_eq!(
        engine.tile_pixel_bounds(&tile),
        BoundingBox::from_coords(0.0, 0.0, 256.0, 256.0)
    );
    let projected = engine.tile_projected_bounds(&tile).unwrap();
    assert_coords_approx_eq!((projected.min().x, projected.min().y), (-180.0, -90.0), 1e-9);
    assert_coords_approx_eq!((projected.max().x, projected.max().y), (0.0, 90.0), 1e-9);
}
