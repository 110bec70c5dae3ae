use std::f64::consts::FRAC_PI_4;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::config::GridMode;
use crate::error::{DottedMapError, Result};

/// Sphere radius of the spherical Web Mercator projection (EPSG:3857)
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Project a geographic coordinate (lng, lat) to Web Mercator meters
#[inline]
pub fn project(lng: f64, lat: f64) -> DVec2 {
    let x = EARTH_RADIUS * lng.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    DVec2::new(x, y)
}

/// Unproject Web Mercator meters back to (lng, lat)
#[inline]
pub fn unproject(p: DVec2) -> (f64, f64) {
    let lng = (p.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (p.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lng, lat)
}

/// Round half towards positive infinity, so -2.5 snaps to -2 like 2.5 snaps to 3
#[inline(always)]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Integer cell of the dot grid, rendered as `col;row`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub col: i64,
    pub row: i64,
}

impl GridKey {
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}

impl std::fmt::Display for GridKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.col, self.row)
    }
}

impl std::str::FromStr for GridKey {
    type Err = DottedMapError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || DottedMapError::invalid(format!("malformed grid key {s:?}"));
        let (col, row) = s.split_once(';').ok_or_else(bad)?;
        Ok(Self {
            col: col.trim().parse().map_err(|_| bad())?,
            row: row.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// Mapping between the pixel grid and the projected plane.
///
/// Pixel `y = 0` sits on the northern edge (`y_max`), so pixel rows grow
/// southwards like an image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFrame {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub x_range: f64,
    pub y_range: f64,
    pub width: u32,
    pub height: u32,
    pub ystep: f64,
    pub grid: GridMode,
}

impl GridFrame {
    /// Project the box corners and fill in a zero dimension from the
    /// projected aspect ratio.
    pub fn new(bbox: &BoundingBox, width: u32, height: u32, grid: GridMode) -> Result<Self> {
        if width == 0 && height == 0 {
            return Err(DottedMapError::invalid("height or width is required"));
        }

        let min = project(bbox.lng.min, bbox.lat.min);
        let max = project(bbox.lng.max, bbox.lat.max);
        let range = max - min;
        if !range.is_finite() || range.x <= 0.0 || range.y <= 0.0 {
            return Err(DottedMapError::degenerate(format!(
                "projected range {} x {} is not usable",
                range.x, range.y
            )));
        }

        let (width, height) = if width == 0 {
            (derive_dimension(height, range.x, range.y)?, height)
        } else if height == 0 {
            (width, derive_dimension(width, range.y, range.x)?)
        } else {
            (width, height)
        };

        Ok(Self {
            x_min: min.x,
            y_min: min.y,
            x_max: max.x,
            y_max: max.y,
            x_range: range.x,
            y_range: range.y,
            width,
            height,
            ystep: grid.ystep(),
            grid,
        })
    }

    /// Number of sampled rows: every `row` with `row * ystep < height`
    pub fn rows(&self) -> u32 {
        let mut rows = 0u32;
        while (rows as f64) * self.ystep < self.height as f64 {
            rows += 1;
        }
        rows
    }

    /// Pixel-space position of a grid cell
    #[inline]
    pub fn local(&self, key: GridKey) -> DVec2 {
        let shift = if self.grid.is_shifted(key.row) { 0.5 } else { 0.0 };
        DVec2::new(key.col as f64 + shift, key.row as f64 * self.ystep)
    }

    #[inline]
    pub fn pixel_to_projected(&self, local: DVec2) -> DVec2 {
        DVec2::new(
            local.x / self.width as f64 * self.x_range + self.x_min,
            self.y_max - local.y / self.height as f64 * self.y_range,
        )
    }

    /// Geographic (lng, lat) of a pixel-space position
    #[inline]
    pub fn pixel_to_geo(&self, local: DVec2) -> (f64, f64) {
        unproject(self.pixel_to_projected(local))
    }

    /// Fractional pixel position of a projected point
    #[inline]
    pub fn projected_to_pixel(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            self.width as f64 * (p.x - self.x_min) / self.x_range,
            self.height as f64 * (self.y_max - p.y) / self.y_range,
        )
    }

    /// Nearest grid cell to a projected point.
    ///
    /// The half-column shift of diagonal rows is taken off before rounding
    /// the column, the inverse of how `local` applies it.
    pub fn snap(&self, p: DVec2) -> GridKey {
        let raw = self.projected_to_pixel(p);
        let row = round_half_up(raw.y / self.ystep) as i64;
        let raw_x = if self.grid.is_shifted(row) {
            raw.x - 0.5
        } else {
            raw.x
        };
        GridKey::new(round_half_up(raw_x) as i64, row)
    }
}

fn derive_dimension(given: u32, other_range: f64, given_range: f64) -> Result<u32> {
    let derived = (given as f64 * other_range / given_range).round();
    if !derived.is_finite() || derived > u32::MAX as f64 {
        return Err(DottedMapError::degenerate(format!(
            "derived dimension {derived} is out of range"
        )));
    }
    Ok(derived as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_project_origin() {
        let p = project(0.0, 0.0);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_known_point() {
        // EPSG:3857 easting of 180 degrees
        let p = project(180.0, 0.0);
        assert_relative_eq!(p.x, 20_037_508.342789244, epsilon = 1e-6);
    }

    #[test]
    fn test_unproject_inverts_project() {
        for &(lng, lat) in &[(2.35, 48.85), (-122.4, 37.8), (151.2, -33.9), (0.0, 70.0)] {
            let (lng2, lat2) = unproject(project(lng, lat));
            assert_relative_eq!(lng, lng2, epsilon = 1e-9);
            assert_relative_eq!(lat, lat2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_derives_width_from_height() {
        let frame = GridFrame::new(&BoundingBox::WORLD, 0, 100, GridMode::Vertical).unwrap();
        let expected = (100.0 * frame.x_range / frame.y_range).round() as u32;
        assert_eq!(frame.width, expected);
        // one pixel of rounding tolerance
        let err = (frame.width as f64 * frame.y_range - 100.0 * frame.x_range).abs();
        assert!(err <= frame.y_range);
    }

    #[test]
    fn test_derives_height_from_width() {
        let frame = GridFrame::new(&BoundingBox::WORLD, 120, 0, GridMode::Vertical).unwrap();
        let err = (frame.height as f64 * frame.x_range - 120.0 * frame.y_range).abs();
        assert!(err <= frame.x_range);
    }

    #[test]
    fn test_rejects_degenerate_box() {
        for bbox in [
            BoundingBox::new(20.0, 20.0, 0.0, 10.0),
            BoundingBox::new(f64::NAN, 20.0, 0.0, 10.0),
        ] {
            assert!(matches!(
                GridFrame::new(&bbox, 10, 10, GridMode::Vertical),
                Err(DottedMapError::DegenerateGeometry(_))
            ));
        }
    }

    #[test]
    fn test_rows_diagonal() {
        let frame = GridFrame::new(&BoundingBox::WORLD, 10, 10, GridMode::Diagonal).unwrap();
        // 11 * 0.866 = 9.53 < 10, 12 * 0.866 = 10.39
        assert_eq!(frame.rows(), 12);
        let square = GridFrame::new(&BoundingBox::WORLD, 10, 10, GridMode::Vertical).unwrap();
        assert_eq!(square.rows(), 10);
    }

    #[test]
    fn test_snap_inverts_local() {
        for grid in [GridMode::Vertical, GridMode::Diagonal] {
            let frame = GridFrame::new(&BoundingBox::WORLD, 40, 0, grid).unwrap();
            for row in 0..frame.rows() as i64 {
                for col in 0..frame.width as i64 {
                    let key = GridKey::new(col, row);
                    let p = frame.pixel_to_projected(frame.local(key));
                    assert_eq!(frame.snap(p), key);
                }
            }
        }
    }

    #[test]
    fn test_diagonal_shift_on_even_rows() {
        let frame = GridFrame::new(&BoundingBox::WORLD, 10, 10, GridMode::Diagonal).unwrap();
        let row0 = frame.local(GridKey::new(0, 0));
        let row1 = frame.local(GridKey::new(0, 1));
        assert_relative_eq!(row0.x, 0.5);
        assert_relative_eq!(row1.x, 0.0);
        assert_relative_eq!(row1.y, 3f64.sqrt() / 2.0);
    }

    #[test]
    fn test_grid_key_round_trip() {
        let key: GridKey = "12;-3".parse().unwrap();
        assert_eq!(key, GridKey::new(12, -3));
        assert_eq!(key.to_string(), "12;-3");
        assert!("12".parse::<GridKey>().is_err());
    }
}
