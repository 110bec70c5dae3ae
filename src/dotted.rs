use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::BoundingBox;
use crate::config::MapSettings;
use crate::data::CountryIndex;
use crate::error::Result;
use crate::map::{
    build_map, project, unproject, GridKey, GridPoint, MapCache, MapModel, SvgOptions,
};
use crate::svg::{self, SvgSettings};

/// A caller-supplied marker to snap onto the grid
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub svg_options: Option<SvgOptions>,
}

impl Pin {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ..Default::default()
        }
    }
}

/// Canvas description of a map
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImageInfo {
    pub region: BoundingBox,
    pub width: u32,
    pub height: u32,
}

/// Pin placement and rendering over a built map.
///
/// Handles built from a `MapCache` share their model: pins added through
/// one are visible through every other handle for the same settings.
#[derive(Clone, Debug)]
pub struct DottedMap {
    model: Arc<MapModel>,
    avoid_outer_pins: bool,
}

impl DottedMap {
    /// Build a fresh, unshared map
    pub fn new(index: &CountryIndex, settings: &MapSettings) -> Result<Self> {
        let model = build_map(index, settings)?;
        Ok(Self::from_model(Arc::new(model), settings.avoid_outer_pins))
    }

    /// Build through `cache`, sharing the model with other handles
    pub fn cached(cache: &MapCache, settings: &MapSettings) -> Result<Self> {
        let model = cache.get_or_build(settings)?;
        Ok(Self::from_model(model, settings.avoid_outer_pins))
    }

    /// Wrap an existing model, e.g. one imported from JSON. Without a
    /// polygon in the model `avoid_outer_pins` has no effect.
    pub fn from_model(model: Arc<MapModel>, avoid_outer_pins: bool) -> Self {
        Self {
            model,
            avoid_outer_pins,
        }
    }

    pub fn model(&self) -> &Arc<MapModel> {
        &self.model
    }

    /// Nearest grid cell to (lat, lng) and the point it represents, or
    /// `None` when the coordinates are not finite, or when outer pins are
    /// rejected and the location is off the map polygon.
    pub fn snap(&self, lat: f64, lng: f64) -> Option<(GridKey, GridPoint)> {
        let projected = project(lng, lat);
        if !projected.is_finite() {
            return None;
        }
        if self.avoid_outer_pins {
            if let Some(landmass) = self.model.landmass() {
                let (lng, lat) = unproject(projected);
                if !landmass.contains(lng, lat) {
                    return None;
                }
            }
        }

        let frame = self.model.frame();
        let key = frame.snap(projected);
        let local = frame.local(key);
        let (cell_lng, cell_lat) = frame.pixel_to_geo(local);
        let point = GridPoint {
            lat: Some(cell_lat),
            lng: Some(cell_lng),
            ..GridPoint::new(local.x, local.y)
        };
        Some((key, point))
    }

    /// Snapped point for (lat, lng) without touching the map
    pub fn get_pin(&self, lat: f64, lng: f64) -> Option<GridPoint> {
        self.snap(lat, lng).map(|(_, point)| point)
    }

    /// Snap `pin` onto the grid and store it, replacing any dot at that cell
    pub fn add_pin(&self, pin: Pin) -> Option<GridPoint> {
        let (key, mut point) = self.snap(pin.lat, pin.lng)?;
        point.data = pin.data;
        point.svg_options = pin.svg_options;
        self.model.insert(key, point.clone());
        Some(point)
    }

    /// Current dots and pins in emission order
    pub fn points(&self) -> Vec<GridPoint> {
        self.model.points()
    }

    pub fn to_svg(&self, settings: &SvgSettings) -> String {
        svg::render(
            self.model.width(),
            self.model.height(),
            &self.model.points(),
            settings,
        )
    }

    pub fn image(&self) -> ImageInfo {
        ImageInfo {
            region: *self.model.region(),
            width: self.model.width(),
            height: self.model.height(),
        }
    }
}
