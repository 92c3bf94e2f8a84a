use serde::{Deserialize, Serialize};

/// A point on the map in the simple (metric) CRS used by the tile pyramid.
///
/// `lng` grows eastwards and `lat` grows northwards, so every on-map point
/// has `lat <= 0` with the map origin in the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
    Mortar,
    Target,
    Fob,
}

/// Returned when a raw pin type code or name does not name a known type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pin type: {0}")]
pub struct UnknownPinType(pub String);

impl PinType {
    pub const ALL: [PinType; 3] = [PinType::Mortar, PinType::Target, PinType::Fob];

    /// Numeric code used by saved annotations and UI selectors.
    pub fn code(self) -> u8 {
        match self {
            PinType::Mortar => 0,
            PinType::Target => 1,
            PinType::Fob => 2,
        }
    }

    /// Whether pins of this type carry a pair of range circles.
    pub fn has_range_circles(self) -> bool {
        matches!(self, PinType::Mortar | PinType::Fob)
    }
}

impl std::fmt::Display for PinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinType::Mortar => write!(f, "mortar"),
            PinType::Target => write!(f, "target"),
            PinType::Fob => write!(f, "fob"),
        }
    }
}

impl TryFrom<u8> for PinType {
    type Error = UnknownPinType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PinType::Mortar),
            1 => Ok(PinType::Target),
            2 => Ok(PinType::Fob),
            other => Err(UnknownPinType(other.to_string())),
        }
    }
}

impl std::str::FromStr for PinType {
    type Err = UnknownPinType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mortar" => Ok(PinType::Mortar),
            "target" => Ok(PinType::Target),
            "fob" => Ok(PinType::Fob),
            _ => Err(UnknownPinType(s.to_string())),
        }
    }
}

/// Real-world extent of a map in meters. Serialized as `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct MapBounds {
    pub width: f64,
    pub height: f64,
}

impl From<[f64; 2]> for MapBounds {
    fn from([width, height]: [f64; 2]) -> Self {
        MapBounds { width, height }
    }
}

impl From<MapBounds> for [f64; 2] {
    fn from(b: MapBounds) -> Self {
        [b.width, b.height]
    }
}

impl MapBounds {
    pub const fn square(size: f64) -> Self {
        MapBounds {
            width: size,
            height: size,
        }
    }
}

/// Pixel-space data used to line a raw heightmap up with the tile pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    pub heightmap_dimensions: [u32; 2],
    /// Top-left and bottom-right corners of the minimap, in heightmap pixels
    /// (1 px = 1 cm).
    pub minimap_corners: [[f64; 2]; 2],
    pub origin_px: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_scale_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_scale_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescriptor {
    pub name: String,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url: String,
    pub bounds: MapBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<Calibration>,
}

impl MapDescriptor {
    pub fn new(name: &str, url: &str, bounds: MapBounds) -> Self {
        MapDescriptor {
            name: name.to_string(),
            url: url.to_string(),
            bounds,
            calibration: None,
        }
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Fill in the tile URL template for one tile of the pyramid.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        self.url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Whether `pos` lies within the playable area.
    pub fn contains(&self, pos: LatLng) -> bool {
        let x = pos.lng;
        let y = -pos.lat;
        (0.0..=self.bounds.width).contains(&x) && (0.0..=self.bounds.height).contains(&y)
    }
}
