//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::{anyhow, Context, Result};
use projection::GeodeticProjection;
use serde_json::{json, Value};
use std::sync::Arc;
use tcrs_common::{BoundingBox, LatLng, TileAddress};
use tiled_crs::{parse_display, PyramidRegistry, TiledCrsEngine};
use tracing::info;

fn engine(
    registry: &PyramidRegistry,
    projection: Arc<dyn GeodeticProjection>,
    pyramid: &str,
) -> Result<TiledCrsEngine> {
    TiledCrsEngine::from_registry(registry, pyramid, projection)
        .with_context(|| format!("Unknown pyramid {}", pyramid))
}

fn parse_bbox(text: &str) -> Result<BoundingBox> {
    BoundingBox::parse(text).with_context(|| format!("Invalid bbox {:?}", text))
}

pub fn pyramids(registry: &PyramidRegistry) -> Value {
    let pyramids: Vec<Value> = registry
        .iter()
        .map(|def| {
            json!({
                "name": def.name(),
                "code": def.code(),
                "output_crs": registry.supported_output_crs(def.name()),
                "bounds": def.bounds().to_string(),
                "tile_size": def.tile_size(),
                "zoom_levels": def.max_zoom(),
            })
        })
        .collect();
    Value::Array(pyramids)
}

pub fn point(
    registry: &PyramidRegistry,
    projection: Arc<dyn GeodeticProjection>,
    pyramid: &str,
    zoom: i32,
    lat: f64,
    lon: f64,
) -> Result<Value> {
    let engine = engine(registry, projection, pyramid)?;
    let pixel = engine.lat_lng_to_point(LatLng::new(lat, lon), zoom)?;
    let tile_size = engine.tile_size();
    let tile = TileAddress::new(
        (pixel.x / tile_size).floor() as i64,
        (pixel.y / tile_size).floor() as i64,
        zoom,
    );

    Ok(json!({
        "pyramid": engine.name(),
        "zoom": zoom,
        "pixel": pixel,
        "tile": tile,
        "tile_bounds": engine.tile_projected_bounds(&tile)?.to_string(),
    }))
}

pub fn fit(
    registry: &PyramidRegistry,
    projection: Arc<dyn GeodeticProjection>,
    pyramid: &str,
    bbox: &str,
    geographic: bool,
    display: &str,
) -> Result<Value> {
    let engine = engine(registry, projection, pyramid)?;
    let bounds = parse_bbox(bbox)?;
    let display_bounds =
        parse_display(display).ok_or_else(|| anyhow!("Invalid display {:?}", display))?;

    let zoom = if geographic {
        engine.fit_geographic_bounds_to_display(&bounds, &display_bounds)
    } else {
        engine.fit_projected_bounds_to_display(&bounds, &display_bounds)
    };
    info!(pyramid = %engine.name(), zoom, "Fitted bounds to display");

    Ok(json!({
        "pyramid": engine.name(),
        "display": display_bounds.size(),
        "zoom": zoom,
        "fits": zoom >= 0,
    }))
}

#[allow(clippy::too_many_arguments)]
pub fn tiles(
    registry: &PyramidRegistry,
    projection: Arc<dyn GeodeticProjection>,
    pyramid: &str,
    zoom: i32,
    bbox: &str,
    geographic: bool,
    start: usize,
    page_size: usize,
) -> Result<Value> {
    let engine = engine(registry, projection, pyramid)?;
    let bounds = parse_bbox(bbox)?;

    let extent = if geographic {
        engine.geographic_pixel_bounds(&bounds, zoom)?
    } else {
        engine.pixel_bounds_for_projected_bounds(zoom, &bounds)?
    };
    let tiles = engine.tiles_for_extent(&extent, zoom, start, page_size)?;
    info!(pyramid = %engine.name(), zoom, count = tiles.len(), "Planned tiles");

    Ok(json!({
        "pyramid": engine.name(),
        "zoom": zoom,
        "pixel_bounds": extent.to_string(),
        "total": engine.tile_count(zoom, &extent),
        "start": start,
        "tiles": tiles,
    }))
}
