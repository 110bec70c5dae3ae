use geo::BoundingRect;

use crate::bounds::BoundingBox;
use crate::data::CountryIndex;
use crate::error::{DottedMapError, Result};
use crate::map::landmass::Landmass;

/// Polygon and geographic box a map is sampled over
#[derive(Clone, Debug)]
pub struct ResolvedRegion {
    pub landmass: Landmass,
    pub bbox: BoundingBox,
}

/// Resolve the requested countries and optional explicit box.
///
/// - countries given: union of their polygons, box enclosing that union
/// - nothing given: every polygon in the dataset, `BoundingBox::WORLD`
/// - explicit region: always wins over the computed box
pub fn resolve(
    index: &CountryIndex,
    countries: &[String],
    region: Option<BoundingBox>,
) -> Result<ResolvedRegion> {
    index.check_known(countries)?;
    if let Some(region) = &region {
        region.validate()?;
    }

    if countries.is_empty() {
        return Ok(ResolvedRegion {
            landmass: Landmass::new(index.world()),
            bbox: region.unwrap_or(BoundingBox::WORLD),
        });
    }

    let polygons = index.union(countries);
    let bbox = match region {
        Some(region) => region,
        None => {
            let rect = polygons.bounding_rect().ok_or_else(|| {
                DottedMapError::degenerate(format!(
                    "countries {} have no coordinates",
                    countries.join(", ")
                ))
            })?;
            let bbox = BoundingBox::from(rect);
            if !bbox.has_area() {
                return Err(DottedMapError::degenerate(format!(
                    "countries {} span a zero-area box",
                    countries.join(", ")
                )));
            }
            bbox
        }
    };

    Ok(ResolvedRegion {
        landmass: Landmass::new(polygons),
        bbox,
    })
}
