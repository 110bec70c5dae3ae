use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::map::landmass::Landmass;
use crate::map::projection::{GridFrame, GridKey};

/// Per-point rendering overrides
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// A dot of the map, in pixel space.
///
/// `x` is the column (half-shifted on diagonal grids), `y` the row scaled by
/// the row pitch. Pins also carry the geographic position of their cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_options: Option<SvgOptions>,
}

impl GridPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

/// Built dot grid plus everything needed to map between pixels and
/// geographic coordinates.
///
/// Only `points` changes after construction. It sits behind a lock because
/// cached models are shared by every map handed out for the same settings,
/// and pins added through one handle show up in all of them.
#[derive(Debug)]
pub struct MapModel {
    frame: GridFrame,
    region: BoundingBox,
    landmass: Option<Landmass>,
    points: RwLock<IndexMap<GridKey, GridPoint>>,
}

impl MapModel {
    pub(crate) fn new(
        frame: GridFrame,
        region: BoundingBox,
        landmass: Option<Landmass>,
        points: IndexMap<GridKey, GridPoint>,
    ) -> Self {
        Self {
            frame,
            region,
            landmass,
            points: RwLock::new(points),
        }
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    /// Resolved polygon; absent for models imported without one
    pub fn landmass(&self) -> Option<&Landmass> {
        self.landmass.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Current points in insertion order
    pub fn points(&self) -> Vec<GridPoint> {
        self.points.read().values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<GridKey> {
        self.points.read().keys().copied().collect()
    }

    pub fn get(&self, key: GridKey) -> Option<GridPoint> {
        self.points.read().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    /// Insert or overwrite the point at `key`. An overwritten cell keeps its
    /// original position in iteration order.
    pub(crate) fn insert(&self, key: GridKey, point: GridPoint) {
        self.points.write().insert(key, point);
    }

    pub fn to_record(&self, with_polygon: bool) -> MapRecord {
        MapRecord {
            points: self
                .points
                .read()
                .iter()
                .map(|(key, point)| (key.to_string(), point.clone()))
                .collect(),
            frame: self.frame,
            region: self.region,
            poly: if with_polygon {
                self.landmass.clone()
            } else {
                None
            },
        }
    }

    pub fn from_record(record: MapRecord) -> Result<Self> {
        let points = record
            .points
            .into_iter()
            .map(|(key, point)| key.parse::<GridKey>().map(|key| (key, point)))
            .collect::<Result<IndexMap<_, _>>>()?;
        Ok(Self::new(record.frame, record.region, record.poly, points))
    }

    pub fn to_json(&self, with_polygon: bool) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record(with_polygon))?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: MapRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }
}

/// Serialized form of a `MapModel`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapRecord {
    /// Points keyed `col;row`, in emission order
    pub points: IndexMap<String, GridPoint>,
    pub frame: GridFrame,
    pub region: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poly: Option<Landmass>,
}
