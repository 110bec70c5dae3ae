use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::MapSettings;
use crate::data::CountryIndex;
use crate::error::Result;
use crate::map::builder::build_map;
use crate::map::model::MapModel;

type Slot = Arc<OnceCell<Arc<MapModel>>>;

/// Built maps over one country dataset, keyed by settings signature.
/// Unbounded, entries live as long as the cache.
///
/// Each signature gets its own slot, so concurrent requests for the same
/// settings build once while different settings build in parallel. Settings
/// are validated before the lookup. Failed builds leave the slot empty and
/// the next request retries.
pub struct MapCache {
    index: Arc<CountryIndex>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl MapCache {
    pub fn new(index: Arc<CountryIndex>) -> Self {
        Self {
            index,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Dataset every cached map is built from
    pub fn index(&self) -> &Arc<CountryIndex> {
        &self.index
    }

    pub fn get_or_build(&self, settings: &MapSettings) -> Result<Arc<MapModel>> {
        settings.validate(&self.index)?;
        let key = settings.cache_key();
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        if let Some(model) = slot.get() {
            debug!(%key, "map cache hit");
            return Ok(Arc::clone(model));
        }

        let model = slot.get_or_try_init(|| {
            debug!(%key, "map cache miss");
            build_map(&self.index, settings).map(Arc::new)
        })?;
        Ok(Arc::clone(model))
    }

    /// Number of signatures with a built map
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DottedMapError;
    use std::thread;

    fn world_cache() -> MapCache {
        MapCache::new(Arc::new(CountryIndex::simple_world()))
    }

    #[test]
    fn test_same_settings_share_model() {
        let cache = world_cache();
        let a = cache.get_or_build(&MapSettings::with_size(40, 0)).unwrap();
        let b = cache.get_or_build(&MapSettings::with_size(40, 0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get_or_build(&MapSettings::with_size(41, 0)).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = world_cache();
        assert!(cache.get_or_build(&MapSettings::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_joined_country_ids_are_not_served_from_cache() {
        let cache = world_cache();
        let split = MapSettings {
            height: 10,
            countries: vec!["USA".into(), "FRA".into()],
            ..Default::default()
        };
        assert!(!cache.get_or_build(&split).unwrap().is_empty());

        let joined = MapSettings {
            countries: vec!["USA,FRA".into()],
            ..split.clone()
        };
        let err = cache.get_or_build(&joined).unwrap_err();
        assert!(matches!(err, DottedMapError::InvalidInput(_)));
        assert!(err.to_string().contains("Invalid country codes: USA,FRA"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_builds_from_own_index() {
        let geojson: geojson::GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "SQR",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            }]
        }"#
        .parse()
        .unwrap();
        let cache = MapCache::new(Arc::new(CountryIndex::from_geojson(&geojson).unwrap()));
        let settings = MapSettings {
            width: 10,
            countries: vec!["SQR".into()],
            ..Default::default()
        };
        assert!(!cache.get_or_build(&settings).unwrap().is_empty());

        let usa = MapSettings {
            countries: vec!["USA".into()],
            ..settings
        };
        assert!(cache.get_or_build(&usa).is_err());
        assert!(!cache.index().contains("USA"));
    }

    #[test]
    fn test_concurrent_builds_converge() {
        let cache = world_cache();
        let settings = MapSettings::with_size(60, 0);
        let models: Vec<Arc<MapModel>> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| cache.get_or_build(&settings).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for model in &models[1..] {
            assert!(Arc::ptr_eq(&models[0], model));
        }
    }
}
