//! Map catalog, range tables and grid references shared by the planner crates.

pub mod catalog;
pub mod constants;
pub mod grid;
pub mod models;

pub use catalog::{CalibrationReport, CatalogError, MapCatalog};
pub use constants::{AmmoVariant, ConfigError, RangeConfig};
pub use grid::{GridReference, KeypadGrid};
pub use models::{Calibration, LatLng, MapBounds, MapDescriptor, PinType, UnknownPinType};
