use serde::{Deserialize, Serialize};

use crate::error::{DottedMapError, Result};

/// Latitude where spherical Web Mercator becomes square, in degrees
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Closed interval of degrees on one axis
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline(always)]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Geographic bounding box in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat: Range,
    pub lng: Range,
}

impl BoundingBox {
    /// Usable extent of the world dataset: no Antarctica tail, no antimeridian edges
    pub const WORLD: BoundingBox = BoundingBox {
        lat: Range { min: -56.0, max: 71.0 },
        lng: Range { min: -179.0, max: 179.0 },
    };

    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat: Range::new(lat_min, lat_max),
            lng: Range::new(lng_min, lng_max),
        }
    }

    /// Check a caller-supplied region: finite values, `min < max` on both axes
    /// and latitudes inside the Web Mercator limit
    pub fn validate(&self) -> Result<()> {
        let values = [self.lat.min, self.lat.max, self.lng.min, self.lng.max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DottedMapError::invalid(
                "Region coordinates must be finite numbers",
            ));
        }
        if !self.has_area() {
            return Err(DottedMapError::invalid(
                "Region min values must be less than max values",
            ));
        }
        if self.lat.min < -MAX_LATITUDE || self.lat.max > MAX_LATITUDE {
            return Err(DottedMapError::invalid(format!(
                "Region latitudes must be between -{MAX_LATITUDE} and {MAX_LATITUDE}"
            )));
        }
        Ok(())
    }

    /// Finite and non-empty on both axes
    pub fn has_area(&self) -> bool {
        self.lat.is_valid() && self.lng.is_valid()
    }

    /// Smallest box enclosing both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.lat.min.min(other.lat.min),
            self.lat.max.max(other.lat.max),
            self.lng.min.min(other.lng.min),
            self.lng.max.max(other.lng.max),
        )
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.lng.contains(lng) && self.lat.contains(lat)
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        BoundingBox::new(rect.min().y, rect.max().y, rect.min().x, rect.max().x)
    }
}
