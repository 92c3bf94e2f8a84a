//! Fixed radii, icon sizes and per-ammo-variant ballistics values.
//!
//! The raw constants are the stock values; [`RangeConfig`] bundles them into
//! a registry that is handed to each session explicitly, so two sessions can
//! run with different ammo tables.
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::LatLng;

/// Default pin icon edge length in pixels.
pub const ICON_SIZE: u32 = 48;

// Mortar ranges in meters
pub const MIN_DISTANCE: f64 = 50.0;
pub const MAX_DISTANCE: f64 = 2610.0;

// FOB ranges in meters
pub const FOB_RANGE: f64 = 150.0; // build radius
pub const FOB_DISTANCE: f64 = 400.0; // min distance to the next FOB

pub const PS_GER_MAX_DISTANCE: f64 = 1188.0;
pub const PS_BR1_MAX_DISTANCE: f64 = 2609.0;
pub const PS_BR2_MAX_DISTANCE: f64 = 1467.0;

// Muzzle velocities in m/s
pub const VELOCITY: f64 = 160.0;
pub const PS_GER_VELOCITY: f64 = 108.0;
pub const PS_BR1_VELOCITY: f64 = 160.0;
pub const PS_BR2_VELOCITY: f64 = 120.0;

pub const GRAVITY: f64 = 9.81;
pub const MIL_TO_DEG_FACTOR: f64 = 360.0 / 6400.0;

/// How long drag state outlives the release event. The map widget fires a
/// click right after a drag ends; this has to be longer than that gap.
pub const GRACE_DELAY: Duration = Duration::from_millis(10);

/// Where freshly constructed pins sit until they are placed.
pub const SENTINEL_POSITION: LatLng = LatLng::new(-5000.0, -5000.0);

// Range circle colors
pub const MORTAR_MIN_COLOR: &str = "#8BC34A";
pub const MORTAR_MAX_COLOR: &str = "#4CAF50";
pub const FOB_MIN_COLOR: &str = "#03A9F4";
pub const FOB_MAX_COLOR: &str = "#2196F3";
pub const RANGE_FILL_OPACITY: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown ammo variant: {0}")]
    UnknownVariant(String),

    #[error("range config defines no ammo variants")]
    NoVariants,

    #[error("duplicate ammo variant: {0}")]
    DuplicateVariant(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: f64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse range config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmmoVariant {
    pub name: String,
    pub max_distance: f64,
    pub velocity: f64,
}

impl AmmoVariant {
    pub fn new(name: &str, max_distance: f64, velocity: f64) -> Self {
        AmmoVariant {
            name: name.to_string(),
            max_distance,
            velocity,
        }
    }
}

/// Every tunable number a session needs to lay out pins and range circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    pub icon_size: u32,
    pub mortar_min_distance: f64,
    pub fob_build_range: f64,
    pub fob_min_distance: f64,
    pub gravity: f64,
    pub mil_to_deg_factor: f64,
    pub variants: Vec<AmmoVariant>,
}

impl Default for RangeConfig {
    fn default() -> Self {
        RangeConfig {
            icon_size: ICON_SIZE,
            mortar_min_distance: MIN_DISTANCE,
            fob_build_range: FOB_RANGE,
            fob_min_distance: FOB_DISTANCE,
            gravity: GRAVITY,
            mil_to_deg_factor: MIL_TO_DEG_FACTOR,
            variants: vec![
                AmmoVariant::new("standard", MAX_DISTANCE, VELOCITY),
                AmmoVariant::new("ger", PS_GER_MAX_DISTANCE, PS_GER_VELOCITY),
                AmmoVariant::new("br1", PS_BR1_MAX_DISTANCE, PS_BR1_VELOCITY),
                AmmoVariant::new("br2", PS_BR2_MAX_DISTANCE, PS_BR2_VELOCITY),
            ],
        }
    }
}

impl RangeConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: RangeConfig = serde_json::from_str(data)?;
        config.validate()?;
        tracing::info!(variants = config.variants.len(), "Loaded range config");
        Ok(config)
    }

    /// Read a `ranges.json` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }

        let positive = [
            ("iconSize", self.icon_size as f64),
            ("mortarMinDistance", self.mortar_min_distance),
            ("fobBuildRange", self.fob_build_range),
            ("fobMinDistance", self.fob_min_distance),
            ("gravity", self.gravity),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                tracing::warn!(field, value, "Rejected range config");
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                });
            }
        }

        let mut seen = HashSet::new();
        for v in &self.variants {
            if !seen.insert(v.name.as_str()) {
                return Err(ConfigError::DuplicateVariant(v.name.clone()));
            }
            for (field, value) in [("maxDistance", v.max_distance), ("velocity", v.velocity)] {
                if !value.is_finite() || value <= 0.0 {
                    tracing::warn!(variant = %v.name, field, value, "Rejected ammo variant");
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.{}", v.name, field),
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn variant(&self, name: &str) -> Result<&AmmoVariant, ConfigError> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| ConfigError::UnknownVariant(name.to_string()))
    }

    /// The first declared variant; the one new sessions start with.
    pub fn default_variant(&self) -> Result<&AmmoVariant, ConfigError> {
        self.variants.first().ok_or(ConfigError::NoVariants)
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.name.as_str()).collect()
    }
}
