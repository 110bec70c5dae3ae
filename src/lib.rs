//! Dot-grid maps of the world, a set of countries or an explicit box.
//!
//! Geographic coordinates are projected with spherical Web Mercator, a
//! regular grid is sampled over the target pixel size and only the cells
//! inside the region's land polygon are kept. Pins at arbitrary coordinates
//! snap onto the nearest cell, and the result renders to SVG.
//!
//! ```no_run
//! use dotted_map::{CountryIndex, DottedMap, MapSettings, Pin, SvgSettings};
//!
//! let index = CountryIndex::simple_world();
//! let map = DottedMap::new(&index, &MapSettings::with_size(120, 0))?;
//! map.add_pin(Pin::new(48.85, 2.35));
//! let svg = map.to_svg(&SvgSettings::default());
//! # Ok::<(), dotted_map::DottedMapError>(())
//! ```

pub mod bounds;
pub mod config;
pub mod data;
pub mod dotted;
pub mod error;
pub mod map;
pub mod svg;

pub use bounds::{BoundingBox, Range};
pub use config::{GridMode, MapSettings};
pub use data::CountryIndex;
pub use dotted::{DottedMap, ImageInfo, Pin};
pub use error::{DottedMapError, Result};
pub use map::{export_json, GridPoint, MapCache, MapModel, SvgOptions};
pub use svg::{Shape, SvgSettings};
