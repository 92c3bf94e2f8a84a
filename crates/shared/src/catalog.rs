use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::models::{Calibration, MapBounds, MapDescriptor};

/// Heightmap pixels are centimeters; reports are in meters.
const PX_PER_METER: f64 = 100.0;

/// Scale applied when a calibration block does not override it.
const DEFAULT_SCALE_PERCENT: f64 = 100.0;

static BUILTIN: Lazy<MapCatalog> = Lazy::new(|| MapCatalog {
    maps: vec![
        MapDescriptor::new(
            "Driel",
            "/img/maps/driel/{z}_{x}_{y}.jpg",
            MapBounds::square(4892.0),
        ),
        MapDescriptor::new(
            "Heelsum",
            "/img/maps/heelsum/{z}_{x}_{y}.jpg",
            MapBounds::square(5611.0),
        ),
        MapDescriptor::new(
            "Johanna",
            "/img/maps/johanna/{z}_{x}_{y}.jpg",
            MapBounds::square(4508.0),
        ),
    ],
});

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No map named {0} exists!")]
    NotFound(String),

    #[error("duplicate map name: {0}")]
    DuplicateName(String),

    #[error("map {name} has invalid bounds {width}x{height}")]
    InvalidBounds { name: String, width: f64, height: f64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse map catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What an operator checks before shipping a newly calibrated map.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub map_name: String,
    /// Real-world map size in meters, from the minimap corners.
    pub extent: (f64, f64),
    pub heightmap_dimensions: (u32, u32),
    pub scale_percent: (f64, f64),
    /// Where to crop the scaled heightmap, in meters.
    pub crop_offset: (f64, f64),
}

impl CalibrationReport {
    pub fn from_calibration(map_name: &str, cal: &Calibration) -> Self {
        let [top_left, bottom_right] = cal.minimap_corners;
        CalibrationReport {
            map_name: map_name.to_string(),
            extent: (
                (bottom_right[0] - top_left[0]) / PX_PER_METER,
                (bottom_right[1] - top_left[1]) / PX_PER_METER,
            ),
            heightmap_dimensions: (cal.heightmap_dimensions[0], cal.heightmap_dimensions[1]),
            scale_percent: (
                cal.x_scale_percent.unwrap_or(DEFAULT_SCALE_PERCENT),
                cal.y_scale_percent.unwrap_or(DEFAULT_SCALE_PERCENT),
            ),
            crop_offset: (
                (cal.origin_px[0] - top_left[0]) / PX_PER_METER,
                (cal.origin_px[1] - top_left[1]) / PX_PER_METER,
            ),
        }
    }
}

impl std::fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.map_name)?;
        writeln!(f, "map dimensions:    {}x{}", self.extent.0, self.extent.1)?;
        writeln!(
            f,
            "orig heightmap:    {}x{}",
            self.heightmap_dimensions.0, self.heightmap_dimensions.1
        )?;
        writeln!(
            f,
            "scale heightmap:   x:{}% y:{}%",
            self.scale_percent.0, self.scale_percent.1
        )?;
        write!(f, "crop with offset:  {}x{}", self.crop_offset.0, self.crop_offset.1)
    }
}

/// Ordered registry of playable maps.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCatalog {
    maps: Vec<MapDescriptor>,
}

impl MapCatalog {
    pub fn new(maps: Vec<MapDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for map in &maps {
            if !seen.insert(map.name.as_str()) {
                tracing::warn!(map = %map.name, "Rejected duplicate map name");
                return Err(CatalogError::DuplicateName(map.name.clone()));
            }
            let MapBounds { width, height } = map.bounds;
            if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
                tracing::warn!(map = %map.name, width, height, "Rejected map bounds");
                return Err(CatalogError::InvalidBounds {
                    name: map.name.clone(),
                    width,
                    height,
                });
            }
        }
        Ok(MapCatalog { maps })
    }

    /// The process-wide catalog of stock maps.
    pub fn builtin() -> &'static MapCatalog {
        &BUILTIN
    }

    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let maps: Vec<MapDescriptor> = serde_json::from_str(data)?;
        let catalog = Self::new(maps)?;
        tracing::info!(
            maps = catalog.maps.len(),
            calibrated = catalog.calibration_reports().len(),
            "Loaded map catalog"
        );
        Ok(catalog)
    }

    /// Read a `maps.json` file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Map names in declaration order.
    pub fn list(&self) -> Vec<&str> {
        self.maps.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn maps(&self) -> &[MapDescriptor] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Result<&MapDescriptor, CatalogError> {
        self.maps
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Calibration report for one map; `Ok(None)` if it has no calibration block.
    pub fn describe_calibration(
        &self,
        name: &str,
    ) -> Result<Option<CalibrationReport>, CatalogError> {
        let map = self.resolve(name)?;
        Ok(map
            .calibration
            .as_ref()
            .map(|cal| CalibrationReport::from_calibration(&map.name, cal)))
    }

    /// Reports for every calibrated map, in declaration order.
    pub fn calibration_reports(&self) -> Vec<CalibrationReport> {
        self.maps
            .iter()
            .filter_map(|m| {
                m.calibration
                    .as_ref()
                    .map(|cal| CalibrationReport::from_calibration(&m.name, cal))
            })
            .collect()
    }
}
