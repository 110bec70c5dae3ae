use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::bounds::BoundingBox;
use crate::config::{GridMode, MapSettings};
use crate::data::CountryIndex;
use crate::error::Result;
use crate::map::landmass::Landmass;
use crate::map::model::{GridPoint, MapModel};
use crate::map::projection::{GridFrame, GridKey};
use crate::map::region;

/// Validate settings, resolve the region and sample its dot grid
pub fn build_map(index: &CountryIndex, settings: &MapSettings) -> Result<MapModel> {
    settings.validate(index)?;
    let resolved = region::resolve(index, &settings.countries, settings.region)?;
    build_grid(
        resolved.bbox,
        resolved.landmass,
        settings.width,
        settings.height,
        settings.grid,
    )
}

/// Sample every grid cell over `bbox` and keep the ones inside `landmass`.
///
/// Rows are sampled in parallel but collected in row order, so points come
/// out row-major: rows ascending, columns ascending.
pub fn build_grid(
    bbox: BoundingBox,
    landmass: Landmass,
    width: u32,
    height: u32,
    grid: GridMode,
) -> Result<MapModel> {
    let frame = GridFrame::new(&bbox, width, height, grid)?;
    let rows = frame.rows();

    let sampled: Vec<Vec<(GridKey, GridPoint)>> = (0..rows)
        .into_par_iter()
        .map(|row| sample_row(&frame, &landmass, row as i64))
        .collect();

    let points: IndexMap<GridKey, GridPoint> = sampled.into_iter().flatten().collect();
    debug!(
        width = frame.width,
        height = frame.height,
        rows,
        %grid,
        points = points.len(),
        "built dot grid"
    );

    Ok(MapModel::new(frame, bbox, Some(landmass), points))
}

fn sample_row(frame: &GridFrame, landmass: &Landmass, row: i64) -> Vec<(GridKey, GridPoint)> {
    (0..frame.width as i64)
        .filter_map(|col| {
            let key = GridKey::new(col, row);
            let local = frame.local(key);
            let (lng, lat) = frame.pixel_to_geo(local);
            landmass
                .contains(lng, lat)
                .then(|| (key, GridPoint::new(local.x, local.y)))
        })
        .collect()
}
