use postscriptum_shared::constants::ICON_SIZE;
use serde::{Deserialize, Serialize};

/// Vertical anchor offset at the default icon size, scaled for other sizes.
const ANCHOR_TIP_PX: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub icon_url: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (f64, f64),
    /// Where popups open relative to `icon_anchor`.
    pub popup_anchor: (f64, f64),
}

impl Icon {
    /// Icon at `size` pixels, anchored relative to the stock 48px artwork.
    pub fn new(url: &str, size: u32) -> Self {
        Self::scaled(url, size, ICON_SIZE)
    }

    /// Icon at `size` pixels for artwork whose default size is `base_size`.
    ///
    /// The anchor scales with `size` so the pin tip stays on the same spot;
    /// the popup anchor only depends on `base_size`.
    pub fn scaled(url: &str, size: u32, base_size: u32) -> Self {
        let size_f = size as f64;
        let base_f = base_size.max(1) as f64;
        Icon {
            icon_url: url.to_string(),
            icon_size: (size, size),
            icon_anchor: (size_f / 2.0, ANCHOR_TIP_PX * size_f / base_f),
            popup_anchor: (0.0, -base_f / 2.0),
        }
    }

    pub fn size(&self) -> u32 {
        self.icon_size.0
    }
}
