//! Coordinate conversions and tile enumeration over one pyramid.
//!
//! Four coordinate spaces are involved:
//!
//! - geographic: latitude/longitude in degrees (bounds use x = lon, y = lat)
//! - projected: the pyramid's coordinate system, before scaling
//! - pixel: projected units scaled for a zoom level, origin at the pyramid
//!   origin, y growing downwards
//! - tile: pixel coordinates divided by the tile size
//!
//! The engine is immutable once built and can be shared between threads.

use crate::pyramid::PyramidDefinition;
use crate::registry::PyramidRegistry;
use projection::{BuiltinProjection, GeodeticProjection};
use std::sync::Arc;
use tcrs_common::{
    AffineScaleTransform, BoundingBox, LatLng, TcrsError, TcrsResult, TileAddress, Vector2,
};
use tracing::{debug, warn};

/// Page size used when a caller has no preference.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

pub struct TiledCrsEngine {
    definition: Arc<PyramidDefinition>,
    transformation: AffineScaleTransform,
    projection: Arc<dyn GeodeticProjection>,
    /// Largest tile index per zoom for the pyramid's full bounds.
    max_tile_bounds: Vec<BoundingBox>,
}

impl std::fmt::Debug for TiledCrsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiledCrsEngine")
            .field("pyramid", &self.definition.name())
            .field("code", &self.definition.code())
            .field("levels", &self.max_tile_bounds.len())
            .finish()
    }
}

impl TiledCrsEngine {
    pub fn new(definition: Arc<PyramidDefinition>, projection: Arc<dyn GeodeticProjection>) -> Self {
        let transformation = definition.transformation();
        let bounds = definition.bounds();
        let tile_size = definition.tile_size() as f64;

        let max_tile_bounds = definition
            .scales()
            .iter()
            .map(|&scale| {
                tile_bounds(
                    &pixel_bounds(&transformation, &bounds, scale),
                    tile_size,
                )
            })
            .collect();

        debug!(
            pyramid = %definition.name(),
            code = %definition.code(),
            levels = definition.max_zoom(),
            "Initialized tiled CRS engine"
        );

        Self {
            definition,
            transformation,
            projection,
            max_tile_bounds,
        }
    }

    /// Engine over `definition` using the built-in projections.
    pub fn with_builtin_projection(definition: Arc<PyramidDefinition>) -> Self {
        Self::new(definition, Arc::new(BuiltinProjection::new()))
    }

    /// Look up `identifier` in `registry` and build an engine for it.
    pub fn from_registry(
        registry: &PyramidRegistry,
        identifier: &str,
        projection: Arc<dyn GeodeticProjection>,
    ) -> TcrsResult<Self> {
        Ok(Self::new(registry.get(identifier)?, projection))
    }

    pub fn definition(&self) -> &PyramidDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Number of zoom levels.
    pub fn max_zoom(&self) -> usize {
        self.definition.max_zoom()
    }

    pub fn tile_size(&self) -> f64 {
        self.definition.tile_size() as f64
    }

    /// Tile index bounds of the whole pyramid at `zoom`.
    ///
    /// The minimum is taken to be (0, 0) by the tile clip regardless of the
    /// stored value.
    pub fn max_tile_bounds(&self, zoom: i32) -> TcrsResult<BoundingBox> {
        usize::try_from(zoom)
            .ok()
            .and_then(|z| self.max_tile_bounds.get(z).copied())
            .ok_or(TcrsError::ZoomOutOfRange {
                zoom,
                max_zoom: self.max_zoom(),
            })
    }

    fn scale(&self, zoom: i32) -> TcrsResult<f64> {
        self.definition.scale(zoom)
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Projected bounds to pixel bounds at `zoom`.
    pub fn pixel_bounds_for_projected_bounds(
        &self,
        zoom: i32,
        bounds: &BoundingBox,
    ) -> TcrsResult<BoundingBox> {
        Ok(pixel_bounds(&self.transformation, bounds, self.scale(zoom)?))
    }

    /// Projected bounds to the (floored) tile indices they touch at `zoom`.
    pub fn tile_bounds_for_projected_bounds(
        &self,
        zoom: i32,
        bounds: &BoundingBox,
    ) -> TcrsResult<BoundingBox> {
        let pixels = self.pixel_bounds_for_projected_bounds(zoom, bounds)?;
        Ok(tile_bounds(&pixels, self.tile_size()))
    }

    /// Geographic coordinate to pixel coordinate at `zoom`.
    pub fn lat_lng_to_point(&self, latlng: LatLng, zoom: i32) -> TcrsResult<Vector2> {
        let scale = self.scale(zoom)?;
        let projected = self.projection.project(self.definition.code(), latlng)?;
        Ok(self.transformation.transform(projected, scale))
    }

    /// Pixel coordinate at `zoom` to geographic coordinate.
    pub fn point_to_lat_lng(&self, point: Vector2, zoom: i32) -> TcrsResult<LatLng> {
        let scale = self.scale(zoom)?;
        let projected = self.transformation.untransform(point, scale);
        Ok(self.projection.unproject(self.definition.code(), projected)?)
    }

    /// Projected bounds to pixel bounds at `zoom`, each corner rounded to
    /// the nearest pixel.
    pub fn pixel_bounds_of(&self, bounds: &BoundingBox, zoom: i32) -> TcrsResult<BoundingBox> {
        let scale = self.scale(zoom)?;
        Ok(bounds.map_corners(|p| self.transformation.transform(p, scale).round()))
    }

    /// Geographic bounds (x = lon, y = lat) to rounded pixel bounds at `zoom`.
    ///
    /// Only the two corners are projected.
    pub fn geographic_pixel_bounds(
        &self,
        bounds: &BoundingBox,
        zoom: i32,
    ) -> TcrsResult<BoundingBox> {
        let scale = self.scale(zoom)?;
        let code = self.definition.code();
        let min = self
            .projection
            .project(code, LatLng::from_lon_lat(bounds.min()))?;
        let max = self
            .projection
            .project(code, LatLng::from_lon_lat(bounds.max()))?;
        Ok(BoundingBox::new(
            self.transformation.transform(min, scale).round(),
            self.transformation.transform(max, scale).round(),
        ))
    }

    /// The projected extent, centred on `centre`, that exactly fills a
    /// display of `display` pixels at `zoom`.
    pub fn projected_bounds_for_display_bounds(
        &self,
        zoom: i32,
        centre: Vector2,
        display: &BoundingBox,
    ) -> TcrsResult<BoundingBox> {
        let scale = self.scale(zoom)?;
        let centre_px = self.transformation.transform(centre, scale);
        let half = display.size() / 2.0;
        Ok(BoundingBox::new(
            self.transformation.untransform(centre_px - half, scale),
            self.transformation.untransform(centre_px + half, scale),
        ))
    }

    // ========================================================================
    // Fit to display
    // ========================================================================

    /// Highest zoom at which projected `bounds` fit inside `display`.
    ///
    /// Returns -1 when the bounds do not fit even at zoom 0.
    pub fn fit_projected_bounds_to_display(&self, bounds: &BoundingBox, display: &BoundingBox) -> i32 {
        self.fit_to_display(display, |zoom| self.pixel_bounds_of(bounds, zoom))
    }

    /// Highest zoom at which geographic `bounds` fit inside `display`.
    ///
    /// A projection failure stops the scan and the last zoom that fitted is
    /// returned; -1 when nothing fitted.
    pub fn fit_geographic_bounds_to_display(
        &self,
        bounds: &BoundingBox,
        display: &BoundingBox,
    ) -> i32 {
        self.fit_to_display(display, |zoom| self.geographic_pixel_bounds(bounds, zoom))
    }

    fn fit_to_display<F>(&self, display: &BoundingBox, mut pixel_bounds_at: F) -> i32
    where
        F: FnMut(i32) -> TcrsResult<BoundingBox>,
    {
        let levels = self.max_zoom() as i32;
        for zoom in 0..levels {
            match pixel_bounds_at(zoom) {
                Ok(pixels) => {
                    if display.width() < pixels.width() || display.height() < pixels.height() {
                        return zoom - 1;
                    }
                }
                Err(e) => {
                    warn!(
                        pyramid = %self.definition.name(),
                        zoom,
                        error = %e,
                        "Projection failed while fitting bounds to display, using best zoom so far"
                    );
                    return zoom - 1;
                }
            }
        }
        levels - 1
    }

    // ========================================================================
    // Tile enumeration
    // ========================================================================

    /// Tiles covering a pixel-space `extent` at `zoom`, nearest to the
    /// extent's centre first.
    ///
    /// `start` skips that many cells of the row-major grid spanned by the
    /// extent; at most `page_size` tiles inside the pyramid are returned.
    pub fn tiles_for_extent(
        &self,
        extent: &BoundingBox,
        zoom: i32,
        start: usize,
        page_size: usize,
    ) -> TcrsResult<Vec<TileAddress>> {
        let limit = self.max_tile_bounds(zoom)?;
        let tile_size = self.tile_size();
        let range = tile_bounds(extent, tile_size);

        // Indices of huge extents saturate at the i64 range; the offset
        // arithmetic is widened so it cannot overflow.
        let (min_x, min_y) = (range.min().x as i64 as i128, range.min().y as i64 as i128);
        let (max_x, max_y) = (range.max().x as i64 as i128, range.max().y as i64 as i128);
        let (limit_x, limit_y) = (limit.max().x as i128, limit.max().y as i128);

        let width = max_x + 1 - min_x;
        let offset = i128::try_from(start).unwrap_or(i128::MAX);
        let (start_row, start_col) = if offset > 0 {
            (min_y + offset / width, min_x + offset % width)
        } else {
            (min_y, min_x)
        };

        // Rows are clipped inclusively, columns exclusively.
        let last_row = max_y.min(limit_y);
        let last_col = max_x.min(limit_x - 1);

        let mut tiles = Vec::new();
        'rows: for row in start_row.max(0)..=last_row {
            let first_col = if row == start_row { start_col } else { min_x };
            for col in first_col.max(0)..=last_col {
                if tiles.len() >= page_size {
                    break 'rows;
                }
                // Both indices lie inside the pyramid here.
                tiles.push(TileAddress::new(col as i64, row as i64, zoom));
            }
        }

        let centre = extent.centre() / tile_size;
        let mut by_distance: Vec<(f64, TileAddress)> = tiles
            .into_iter()
            .map(|tile| (centre.distance_to(&tile.centre()), tile))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        debug!(
            pyramid = %self.definition.name(),
            zoom,
            start,
            count = by_distance.len(),
            "Enumerated tiles for extent"
        );

        Ok(by_distance.into_iter().map(|(_, tile)| tile).collect())
    }

    /// [`tiles_for_extent`](Self::tiles_for_extent) for projected bounds.
    pub fn tiles_for_projected_extent(
        &self,
        bounds: &BoundingBox,
        zoom: i32,
        start: usize,
        page_size: usize,
    ) -> TcrsResult<Vec<TileAddress>> {
        let extent = self.pixel_bounds_for_projected_bounds(zoom, bounds)?;
        self.tiles_for_extent(&extent, zoom, start, page_size)
    }

    /// [`tiles_for_extent`](Self::tiles_for_extent) for geographic bounds.
    ///
    /// Projection failures are returned as errors.
    pub fn tiles_for_geographic_extent(
        &self,
        bounds: &BoundingBox,
        zoom: i32,
        start: usize,
        page_size: usize,
    ) -> TcrsResult<Vec<TileAddress>> {
        let extent = self.geographic_pixel_bounds(bounds, zoom)?;
        self.tiles_for_extent(&extent, zoom, start, page_size)
    }

    /// Number of columns spanned by tile `bounds`; 0 for zoom -1 or no bounds.
    pub fn tile_width(&self, zoom: i32, bounds: Option<&BoundingBox>) -> i64 {
        match bounds {
            Some(b) if zoom != -1 => span(b.min().x, b.max().x),
            _ => 0,
        }
    }

    /// Number of rows spanned by tile `bounds`; 0 for zoom -1 or no bounds.
    pub fn tile_height(&self, zoom: i32, bounds: Option<&BoundingBox>) -> i64 {
        match bounds {
            Some(b) if zoom != -1 => span(b.min().y, b.max().y),
            _ => 0,
        }
    }

    /// Number of tiles touched by pixel `bounds`, ignoring pyramid limits.
    pub fn tile_count(&self, zoom: i32, bounds: &BoundingBox) -> i64 {
        let tiles = tile_bounds(bounds, self.tile_size());
        self.tile_width(zoom, Some(&tiles))
            .saturating_mul(self.tile_height(zoom, Some(&tiles)))
    }

    /// Pixel bounds of projected `extent` at `zoom`, grown outwards to whole
    /// tiles.
    pub fn tile_rounded_pixel_bounds_for_extent(
        &self,
        extent: &BoundingBox,
        zoom: i32,
    ) -> TcrsResult<BoundingBox> {
        let tile_size = self.tile_size();
        let pixels = self.pixel_bounds_for_projected_bounds(zoom, extent)?;
        let min = (pixels.min() / tile_size).floor() * tile_size;
        let max = (pixels.max() / tile_size).ceil() * tile_size;
        Ok(BoundingBox::new(min, max))
    }

    /// Pixel bounds covered by `tile`.
    pub fn tile_pixel_bounds(&self, tile: &TileAddress) -> BoundingBox {
        let tile_size = self.tile_size();
        let corner = tile.corner() * tile_size;
        BoundingBox::new(corner, corner + Vector2::new(tile_size, tile_size))
    }

    /// Projected bounds covered by `tile`.
    pub fn tile_projected_bounds(&self, tile: &TileAddress) -> TcrsResult<BoundingBox> {
        let scale = self.scale(tile.zoom)?;
        Ok(self
            .tile_pixel_bounds(tile)
            .map_corners(|p| self.transformation.untransform(p, scale)))
    }
}

fn pixel_bounds(
    transformation: &AffineScaleTransform,
    bounds: &BoundingBox,
    scale: f64,
) -> BoundingBox {
    bounds.map_corners(|p| transformation.transform(p, scale))
}

/// Inclusive count of indices from `min` to `max`, saturating at `i64::MAX`.
fn span(min: f64, max: f64) -> i64 {
    (max as i64).saturating_add(1).saturating_sub(min as i64)
}

fn tile_bounds(pixels: &BoundingBox, tile_size: f64) -> BoundingBox {
    pixels.map_corners(|p| (p / tile_size).floor())
}
