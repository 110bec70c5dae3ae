use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::data::CountryIndex;
use crate::error::{DottedMapError, Result};

/// Largest accepted pixel width or height
pub const MAX_DIMENSION: u32 = 10_000;

/// Sampling lattice of the dot grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Square lattice, rows one pixel apart
    #[default]
    Vertical,
    /// Triangular lattice, alternate rows shifted half a column
    Diagonal,
}

impl GridMode {
    /// Vertical distance between consecutive rows
    #[inline(always)]
    pub fn ystep(self) -> f64 {
        match self {
            GridMode::Vertical => 1.0,
            GridMode::Diagonal => 3f64.sqrt() / 2.0,
        }
    }

    /// Whether `row` gets the half-column shift
    #[inline(always)]
    pub fn is_shifted(self, row: i64) -> bool {
        self == GridMode::Diagonal && row.rem_euclid(2) == 0
    }
}

impl FromStr for GridMode {
    type Err = DottedMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertical" => Ok(GridMode::Vertical),
            "diagonal" => Ok(GridMode::Diagonal),
            _ => Err(DottedMapError::invalid(
                r#"Grid must be "vertical" or "diagonal""#,
            )),
        }
    }
}

impl fmt::Display for GridMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridMode::Vertical => write!(f, "vertical"),
            GridMode::Diagonal => write!(f, "diagonal"),
        }
    }
}

/// Construction parameters for a dotted map.
///
/// A zero `width` or `height` is derived from the other dimension using the
/// projected aspect ratio of the region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapSettings {
    pub height: u32,
    pub width: u32,
    /// Restrict the map to the union of these countries
    pub countries: Vec<String>,
    /// Explicit geographic box, overrides the countries-derived one
    pub region: Option<BoundingBox>,
    pub grid: GridMode,
    /// Reject pins that fall outside the resolved polygon
    pub avoid_outer_pins: bool,
}

impl MapSettings {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Check every option, reporting the first violated rule
    pub fn validate(&self, index: &CountryIndex) -> Result<()> {
        if self.height == 0 && self.width == 0 {
            return Err(DottedMapError::invalid(
                "Either height or width must be positive",
            ));
        }
        if self.height > MAX_DIMENSION {
            return Err(DottedMapError::invalid(format!(
                "Height must be a number between 0 and {MAX_DIMENSION}"
            )));
        }
        if self.width > MAX_DIMENSION {
            return Err(DottedMapError::invalid(format!(
                "Width must be a number between 0 and {MAX_DIMENSION}"
            )));
        }
        index.check_known(&self.countries)?;
        if let Some(region) = &self.region {
            region.validate()?;
        }
        Ok(())
    }

    /// Signature of everything that shapes the grid. Pin policy is excluded
    /// since it does not change the built points. Fields are JSON encoded so
    /// ids containing separators cannot collide.
    pub fn cache_key(&self) -> String {
        serde_json::json!([
            self.countries,
            self.region,
            self.grid,
            self.height,
            self.width
        ])
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_size() {
        let index = CountryIndex::simple_world();
        let err = MapSettings::default().validate(&index).unwrap_err();
        assert!(matches!(err, DottedMapError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_oversized_height() {
        let index = CountryIndex::simple_world();
        let err = MapSettings::with_size(0, 20_000).validate(&index).unwrap_err();
        assert!(err.to_string().contains("Height"));
    }

    #[test]
    fn test_reports_every_unknown_country() {
        let index = CountryIndex::simple_world();
        let settings = MapSettings {
            height: 10,
            countries: vec!["USA".into(), "XXX".into(), "YYY".into()],
            ..Default::default()
        };
        let msg = settings.validate(&index).unwrap_err().to_string();
        assert!(msg.contains("XXX") && msg.contains("YYY"));
        assert!(!msg.contains("USA"));
    }

    #[test]
    fn test_grid_mode_parsing() {
        assert_eq!("diagonal".parse::<GridMode>().unwrap(), GridMode::Diagonal);
        assert!("hexagonal".parse::<GridMode>().is_err());
    }

    #[test]
    fn test_settings_from_json_uses_defaults() {
        let settings: MapSettings =
            serde_json::from_str(r#"{"width": 40, "grid": "diagonal", "avoidOuterPins": true}"#)
                .unwrap();
        assert_eq!(settings.width, 40);
        assert_eq!(settings.height, 0);
        assert_eq!(settings.grid, GridMode::Diagonal);
        assert!(settings.avoid_outer_pins);
        assert!(settings.countries.is_empty());
    }

    #[test]
    fn test_rejects_oversized_width() {
        let index = CountryIndex::simple_world();
        let err = MapSettings::with_size(10_001, 0).validate(&index).unwrap_err();
        assert!(matches!(err, DottedMapError::InvalidInput(_)));
        assert!(err.to_string().contains("Width must be a number between 0 and 10000"));
        assert!(MapSettings::with_size(MAX_DIMENSION, 0).validate(&index).is_ok());
    }

    #[test]
    fn test_cache_key_separates_country_lists() {
        let joined = MapSettings {
            height: 10,
            countries: vec!["USA,FRA".into()],
            ..Default::default()
        };
        let split = MapSettings {
            countries: vec!["USA".into(), "FRA".into()],
            ..joined.clone()
        };
        assert_ne!(joined.cache_key(), split.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_pin_policy() {
        let a = MapSettings::with_size(10, 0);
        let b = MapSettings {
            avoid_outer_pins: true,
            ..a.clone()
        };
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), MapSettings::with_size(11, 0).cache_key());
    }
}
