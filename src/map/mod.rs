mod builder;
mod cache;
mod landmass;
mod model;
mod projection;
mod region;

pub use builder::{build_grid, build_map};
pub use cache::MapCache;
pub use landmass::Landmass;
pub use model::{GridPoint, MapModel, MapRecord, SvgOptions};
pub use projection::{project, unproject, GridFrame, GridKey, EARTH_RADIUS};
pub use region::{resolve, ResolvedRegion};

use crate::config::MapSettings;
use crate::data::CountryIndex;
use crate::error::Result;

/// Build a map and serialize it; `with_polygon` keeps the resolved polygon so
/// an imported copy can still reject outer pins.
pub fn export_json(index: &CountryIndex, settings: &MapSettings, with_polygon: bool) -> Result<String> {
    build_map(index, settings)?.to_json(with_polygon)
}
