use std::fs;
use std::path::Path;

use geo::{LineString, MultiPolygon, Polygon};
use geojson::{feature::Id, Feature, GeoJson, Geometry, Value};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{DottedMapError, Result};

/// Read-only country boundaries keyed by ISO alpha-3 style identifier.
/// Iteration follows dataset order.
#[derive(Clone, Debug, Default)]
pub struct CountryIndex {
    countries: IndexMap<String, MultiPolygon<f64>>,
}

impl CountryIndex {
    /// Load a GeoJSON FeatureCollection of country boundaries
    pub fn load(path: &Path) -> Result<Self> {
        let mut bytes = fs::read(path)?;
        let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
            .map_err(|e| DottedMapError::Dataset(format!("{}: {}", path.display(), e)))?;
        let index = Self::from_geojson(&geojson)?;
        debug!(path = %path.display(), countries = index.len(), "loaded country dataset");
        Ok(index)
    }

    pub fn from_geojson(geojson: &GeoJson) -> Result<Self> {
        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(DottedMapError::Dataset(
                "country dataset must be a FeatureCollection".to_string(),
            ));
        };

        let mut index = Self::default();
        for feature in &fc.features {
            let Some(id) = feature_id(feature) else {
                warn!("skipping country feature without an id");
                continue;
            };
            let Some(ref geometry) = feature.geometry else {
                warn!(%id, "skipping country feature without geometry");
                continue;
            };
            let mut polygons = Vec::new();
            collect_polygons(geometry, &mut polygons);
            if polygons.is_empty() {
                warn!(%id, "skipping country feature without polygon geometry");
                continue;
            }
            index.insert(id, polygons);
        }
        Ok(index)
    }

    fn insert(&mut self, id: String, polygons: Vec<Polygon<f64>>) {
        self.countries
            .entry(id)
            .or_insert_with(|| MultiPolygon::new(Vec::new()))
            .0
            .extend(polygons);
    }

    pub fn get(&self, id: &str) -> Option<&MultiPolygon<f64>> {
        self.countries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.countries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Fail with every identifier missing from the dataset
    pub fn check_known(&self, ids: &[String]) -> Result<()> {
        let unknown: Vec<&str> = ids
            .iter()
            .filter(|id| !self.contains(id))
            .map(String::as_str)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(DottedMapError::invalid(format!(
                "Invalid country codes: {}",
                unknown.join(", ")
            )))
        }
    }

    /// Polygons of the listed countries, in listed order
    pub fn union(&self, ids: &[String]) -> MultiPolygon<f64> {
        let polygons = ids
            .iter()
            .filter_map(|id| self.get(id))
            .flat_map(|mp| mp.0.iter().cloned())
            .collect();
        MultiPolygon::new(polygons)
    }

    /// Every polygon in the dataset
    pub fn world(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.countries
                .values()
                .flat_map(|mp| mp.0.iter().cloned())
                .collect(),
        )
    }

    /// Simplified country outlines, used when no dataset file is available
    pub fn simple_world() -> Self {
        let mut index = Self::default();
        for (id, outlines) in SIMPLE_WORLD {
            let polygons = outlines
                .iter()
                .map(|ring| Polygon::new(LineString::from(ring.to_vec()), Vec::new()))
                .collect();
            index.insert((*id).to_string(), polygons);
        }
        index
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => return Some(s.clone()),
        Some(Id::Number(n)) => return Some(n.to_string()),
        None => {}
    }
    let props = feature.properties.as_ref()?;
    props
        .get("ISO_A3")
        .or_else(|| props.get("iso_a3"))
        .or_else(|| props.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon<f64>>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            if let Some(polygon) = to_polygon(rings) {
                out.push(polygon);
            }
        }
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| to_polygon(rings)));
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let coords: Vec<(f64, f64)> = ring
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect();
        LineString::from(coords)
    });
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

type Outline = &'static [(f64, f64)];

// (lng, lat) rings, coarse enough to keep tests fast
const SIMPLE_WORLD: &[(&str, &[Outline])] = &[
    (
        "USA",
        &[
            &[
                (-124.7, 48.4), (-124.2, 42.0), (-120.5, 34.5), (-117.1, 32.5),
                (-111.0, 31.3), (-106.5, 31.8), (-97.1, 25.9), (-97.4, 27.8),
                (-93.8, 29.7), (-89.6, 30.2), (-84.9, 29.7), (-82.8, 27.9),
                (-81.0, 25.1), (-80.1, 26.9), (-81.4, 30.7), (-75.5, 35.2),
                (-76.0, 38.0), (-74.0, 40.6), (-70.0, 41.7), (-70.7, 43.1),
                (-67.0, 44.8), (-69.2, 47.4), (-71.5, 45.0), (-76.8, 43.6),
                (-82.5, 41.7), (-83.5, 46.1), (-89.6, 48.0), (-95.2, 49.0),
                (-123.0, 49.0), (-124.7, 48.4),
            ],
            &[
                (-168.0, 65.5), (-164.0, 60.0), (-157.0, 58.5), (-141.0, 59.8),
                (-141.0, 69.6), (-156.5, 71.3), (-166.0, 68.9), (-168.0, 65.5),
            ],
        ],
    ),
    (
        "CAN",
        &[&[
            (-141.0, 59.8), (-130.0, 54.7), (-123.0, 49.0), (-95.2, 49.0),
            (-89.6, 48.0), (-83.5, 46.1), (-82.5, 41.7), (-76.8, 43.6),
            (-71.5, 45.0), (-69.2, 47.4), (-67.0, 44.8), (-60.0, 46.0),
            (-55.6, 51.6), (-64.0, 60.0), (-78.0, 62.5), (-95.0, 62.0),
            (-110.0, 68.0), (-130.0, 70.0), (-141.0, 69.6), (-141.0, 59.8),
        ]],
    ),
    (
        "MEX",
        &[&[
            (-117.1, 32.5), (-114.7, 30.5), (-109.4, 23.2), (-105.5, 20.5),
            (-97.8, 15.9), (-92.2, 14.5), (-90.4, 21.0), (-87.0, 21.5),
            (-90.5, 19.5), (-94.5, 18.2), (-97.1, 25.9), (-106.5, 31.8),
            (-111.0, 31.3), (-117.1, 32.5),
        ]],
    ),
    (
        "BRA",
        &[&[
            (-73.9, -7.3), (-69.9, 1.0), (-60.2, 5.2), (-50.0, 1.8),
            (-44.3, -2.5), (-35.0, -5.5), (-39.0, -13.5), (-41.0, -22.0),
            (-48.5, -26.0), (-53.4, -33.7), (-57.6, -30.2), (-54.6, -25.6),
            (-58.2, -20.2), (-65.3, -10.2), (-73.9, -7.3),
        ]],
    ),
    (
        "ARG",
        &[&[
            (-65.3, -22.1), (-58.2, -20.2), (-54.6, -25.6), (-57.6, -30.2),
            (-58.4, -34.6), (-57.5, -38.2), (-62.3, -38.8), (-65.0, -42.0),
            (-67.6, -46.4), (-68.4, -52.3), (-72.3, -51.5), (-71.6, -44.0),
            (-70.0, -33.0), (-68.6, -24.0), (-65.3, -22.1),
        ]],
    ),
    (
        "GBR",
        &[&[
            (-5.7, 50.0), (1.4, 51.2), (1.7, 52.7), (0.2, 53.5),
            (-1.6, 55.6), (-2.0, 57.6), (-3.0, 58.6), (-5.0, 58.6),
            (-6.2, 56.8), (-4.8, 54.8), (-3.0, 53.9), (-4.7, 52.8),
            (-5.2, 51.7), (-5.7, 50.0),
        ]],
    ),
    (
        "FRA",
        &[&[
            (-4.7, 48.5), (-1.2, 46.2), (-1.8, 43.4), (3.1, 42.4),
            (4.5, 43.4), (7.5, 43.8), (6.9, 46.4), (7.6, 47.6),
            (8.2, 49.0), (6.3, 49.5), (2.5, 51.1), (-1.6, 49.6),
            (-4.7, 48.5),
        ]],
    ),
    (
        "ESP",
        &[&[
            (-9.3, 43.0), (-8.9, 37.0), (-6.0, 36.0), (-2.0, 36.7),
            (0.2, 38.8), (3.2, 41.9), (-1.8, 43.4), (-9.3, 43.0),
        ]],
    ),
    (
        "NGA",
        &[&[
            (2.7, 6.3), (4.9, 6.3), (6.0, 4.3), (8.5, 4.5),
            (9.8, 6.8), (12.2, 8.5), (14.6, 12.2), (13.6, 13.9),
            (10.0, 13.3), (6.5, 13.5), (3.6, 11.7), (2.7, 9.0),
            (2.7, 6.3),
        ]],
    ),
    (
        "ZAF",
        &[&[
            (16.5, -28.6), (20.0, -24.8), (25.9, -24.7), (31.3, -22.4),
            (32.9, -26.8), (30.0, -31.3), (25.7, -34.0), (20.0, -34.8),
            (18.4, -34.1), (16.5, -28.6),
        ]],
    ),
    (
        "IND",
        &[&[
            (68.2, 23.7), (72.9, 20.7), (76.5, 8.9), (80.3, 13.0),
            (80.3, 15.9), (86.9, 21.5), (88.8, 21.6), (88.1, 26.4),
            (80.1, 30.0), (78.0, 35.5), (74.4, 32.8), (70.3, 28.0),
            (68.2, 23.7),
        ]],
    ),
    (
        "CHN",
        &[&[
            (73.7, 39.4), (78.0, 35.5), (80.1, 30.0), (88.1, 27.9),
            (97.4, 28.0), (98.7, 23.2), (106.7, 21.9), (110.3, 20.5),
            (117.3, 23.6), (121.5, 30.1), (119.6, 34.9), (122.2, 40.4),
            (124.3, 40.0), (130.6, 42.7), (134.7, 48.3), (127.5, 49.8),
            (119.6, 47.0), (111.9, 43.7), (96.3, 42.7), (87.0, 49.2),
            (80.3, 42.0), (73.7, 39.4),
        ]],
    ),
    (
        "AUS",
        &[&[
            (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
            (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
            (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
            (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
        ]],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use geo::BoundingRect;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "AAA",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "ISO_A3": "BBB" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20, 0], [30, 0], [30, 5], [20, 0]]],
                        [[[40, 0], [50, 0], [50, 5], [40, 0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [1, 1] }
            }
        ]
    }"#;

    #[test]
    fn test_from_geojson() {
        let geojson: GeoJson = SAMPLE.parse().unwrap();
        let index = CountryIndex::from_geojson(&geojson).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["AAA", "BBB"]);
        assert_eq!(index.get("BBB").unwrap().0.len(), 2);
        assert_eq!(index.world().0.len(), 3);
    }

    #[test]
    fn test_load_through_simd_json() {
        let path = std::env::temp_dir().join("dotted-map-sample-countries.json");
        fs::write(&path, SAMPLE).unwrap();
        let index = CountryIndex::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert!(index.contains("AAA"));
        assert!(index.contains("BBB"));
    }

    #[test]
    fn test_rejects_non_collection() {
        let geojson: GeoJson = r#"{"type": "Point", "coordinates": [1, 1]}"#.parse().unwrap();
        assert!(matches!(
            CountryIndex::from_geojson(&geojson),
            Err(DottedMapError::Dataset(_))
        ));
    }

    #[test]
    fn test_union_keeps_listed_order() {
        let index = CountryIndex::simple_world();
        let union = index.union(&["FRA".to_string(), "USA".to_string()]);
        // FRA has one outline, USA two
        assert_eq!(union.0.len(), 3);
        let first = union.0[0].bounding_rect().unwrap();
        assert!(first.min().x > -10.0);
    }

    #[test]
    fn test_simple_world_ids() {
        let index = CountryIndex::simple_world();
        assert!(index.contains("USA"));
        assert!(index.contains("FRA"));
        assert!(!index.is_empty());
        assert!(index.check_known(&["USA".to_string()]).is_ok());
    }
}
