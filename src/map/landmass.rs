use std::collections::HashMap;

use geo::{BoundingRect, Coord, Intersects, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Cell size of the polygon index, in degrees
const CELL_SIZE: f64 = 5.0;

/// Resolved region polygon with a coarse spatial index for inside tests.
///
/// Each polygon's bounding box is indexed into every cell it overlaps, so a
/// lookup never misses a polygon that could contain the point. Candidates
/// are then tested exactly. Points on a boundary count as inside.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "MultiPolygon<f64>", into = "MultiPolygon<f64>")]
pub struct Landmass {
    polygons: MultiPolygon<f64>,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl Landmass {
    pub fn new(polygons: MultiPolygon<f64>) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, polygon) in polygons.0.iter().enumerate() {
            let Some(rect) = polygon.bounding_rect() else {
                continue;
            };
            let min_cell = to_cell(rect.min().x, rect.min().y);
            let max_cell = to_cell(rect.max().x, rect.max().y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        Self { polygons, cells }
    }

    /// Whether (lng, lat) lies inside or on the edge of any polygon
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        if !lng.is_finite() || !lat.is_finite() {
            return false;
        }
        let Some(candidates) = self.cells.get(&to_cell(lng, lat)) else {
            return false;
        };
        let point = Coord { x: lng, y: lat };
        candidates
            .iter()
            .any(|&idx| self.polygons.0[idx].intersects(&point))
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }
}

#[inline(always)]
fn to_cell(lng: f64, lat: f64) -> (i32, i32) {
    let x = (lng / CELL_SIZE).floor() as i32;
    let y = (lat / CELL_SIZE).floor() as i32;
    (x, y)
}

impl From<MultiPolygon<f64>> for Landmass {
    fn from(polygons: MultiPolygon<f64>) -> Self {
        Self::new(polygons)
    }
}

impl From<Landmass> for MultiPolygon<f64> {
    fn from(landmass: Landmass) -> Self {
        landmass.polygons
    }
}
