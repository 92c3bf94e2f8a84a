use postscriptum_shared::LatLng;
use serde::{Deserialize, Serialize};

use crate::icon::Icon;
use crate::surface::{DisplaySurface, Layer, LayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipOptions {
    pub permanent: bool,
    pub direction: Direction,
    pub offset: (f64, f64),
}

impl TooltipOptions {
    /// Always-visible label sitting one icon height above the pin.
    pub fn drag_label(base_size: u32) -> Self {
        TooltipOptions {
            permanent: true,
            direction: Direction::Top,
            offset: (0.0, -(base_size as f64)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub text: String,
    pub options: TooltipOptions,
}

/// The draggable icon layer of a pin.
#[derive(Debug, Clone)]
pub struct Marker {
    id: LayerId,
    position: LatLng,
    icon: Icon,
    tooltip: Option<Tooltip>,
}

impl Marker {
    pub fn new(position: LatLng, icon: Icon) -> Self {
        Marker {
            id: LayerId::new(),
            position,
            icon,
            tooltip: None,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn is_on(&self, surface: &dyn DisplaySurface) -> bool {
        surface.has_layer(self.id)
    }

    pub(crate) fn add_to(&self, surface: &mut dyn DisplaySurface) {
        if !surface.has_layer(self.id) {
            surface.add_layer(Layer::Marker(self));
        }
    }

    pub(crate) fn remove_from(&self, surface: &mut dyn DisplaySurface) {
        if surface.has_layer(self.id) {
            surface.remove_layer(self.id);
        }
    }

    pub(crate) fn set_position(&mut self, position: LatLng, surface: &mut dyn DisplaySurface) {
        self.position = position;
        if surface.has_layer(self.id) {
            surface.set_layer_position(self.id, position);
        }
    }

    pub(crate) fn set_icon(&mut self, icon: Icon, surface: &mut dyn DisplaySurface) {
        self.icon = icon;
        if surface.has_layer(self.id) {
            surface.set_icon(self.id, &self.icon);
        }
    }

    pub(crate) fn bind_tooltip(&mut self, tooltip: Tooltip, surface: &mut dyn DisplaySurface) {
        if surface.has_layer(self.id) {
            surface.bind_tooltip(self.id, &tooltip);
        }
        self.tooltip = Some(tooltip);
    }

    /// Update the label text; does nothing if no label is bound.
    pub(crate) fn set_tooltip_content(&mut self, text: &str, surface: &mut dyn DisplaySurface) {
        let Some(tooltip) = self.tooltip.as_mut() else {
            return;
        };
        tooltip.text = text.to_string();
        if surface.has_layer(self.id) {
            surface.set_tooltip_content(self.id, text);
        }
    }

    pub(crate) fn unbind_tooltip(&mut self, surface: &mut dyn DisplaySurface) {
        if self.tooltip.take().is_some() && surface.has_layer(self.id) {
            surface.unbind_tooltip(self.id);
        }
    }
}
