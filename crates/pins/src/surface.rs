//! The display surface pins draw onto.
//!
//! Pins keep the authoritative state of their layers. A surface only mirrors
//! it: `add_layer` hands over the full current state, and the per-layer hooks
//! are only called for layers the surface reports as present.
use std::collections::HashMap;

use postscriptum_shared::LatLng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::RangeCircle;
use crate::icon::Icon;
use crate::marker::{Marker, Tooltip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        LayerId(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Borrowed view of a layer being added to a surface.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    Marker(&'a Marker),
    Circle(&'a RangeCircle),
}

impl Layer<'_> {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Marker(m) => m.id(),
            Layer::Circle(c) => c.id(),
        }
    }

    pub fn position(&self) -> LatLng {
        match self {
            Layer::Marker(m) => m.position(),
            Layer::Circle(c) => c.position(),
        }
    }
}

pub trait DisplaySurface {
    fn add_layer(&mut self, layer: Layer<'_>);
    fn remove_layer(&mut self, id: LayerId);
    fn has_layer(&self, id: LayerId) -> bool;

    fn set_layer_position(&mut self, id: LayerId, position: LatLng);
    fn set_icon(&mut self, id: LayerId, icon: &Icon);
    fn bind_tooltip(&mut self, id: LayerId, tooltip: &Tooltip);
    fn set_tooltip_content(&mut self, id: LayerId, text: &str);
    fn unbind_tooltip(&mut self, id: LayerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Marker,
    Circle,
}

/// What a [`HeadlessSurface`] knows about one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRecord {
    pub kind: LayerKind,
    pub position: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// In-memory surface that records layers instead of drawing them.
///
/// Used to replay interaction sequences without a map widget, and by tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    layers: HashMap<LayerId, LayerRecord>,
    order: Vec<LayerId>,
    add_calls: HashMap<LayerId, usize>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.get(&id)
    }

    /// Layers currently present, in the order they were added.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &LayerRecord)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.layers.get(id).map(|r| (*id, r)))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// How many times `add_layer` was called for `id` over the surface's
    /// whole lifetime, including re-adds. Removing a layer keeps its count;
    /// call [`HeadlessSurface::reset_counts`] to drop counts of absent layers.
    pub fn add_count(&self, id: LayerId) -> usize {
        self.add_calls.get(&id).copied().unwrap_or(0)
    }

    /// Forget add counts of layers no longer on the surface.
    pub fn reset_counts(&mut self) {
        let layers = &self.layers;
        self.add_calls.retain(|id, _| layers.contains_key(id));
    }

    /// JSON dump of the present layers, for replay logs.
    pub fn snapshot(&self) -> serde_json::Value {
        self.layers()
            .map(|(id, record)| {
                serde_json::json!({
                    "id": id.to_string(),
                    "layer": record,
                })
            })
            .collect()
    }
}

impl DisplaySurface for HeadlessSurface {
    fn add_layer(&mut self, layer: Layer<'_>) {
        let id = layer.id();
        *self.add_calls.entry(id).or_insert(0) += 1;

        let record = match layer {
            Layer::Marker(m) => LayerRecord {
                kind: LayerKind::Marker,
                position: m.position(),
                icon: Some(m.icon().clone()),
                tooltip: m.tooltip().cloned(),
                radius: None,
                color: None,
            },
            Layer::Circle(c) => LayerRecord {
                kind: LayerKind::Circle,
                position: c.position(),
                icon: None,
                tooltip: None,
                radius: Some(c.radius()),
                color: Some(c.color().to_string()),
            },
        };
        if self.layers.insert(id, record).is_none() {
            self.order.push(id);
        }
    }

    fn remove_layer(&mut self, id: LayerId) {
        if self.layers.remove(&id).is_some() {
            self.order.retain(|l| *l != id);
        }
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    fn set_layer_position(&mut self, id: LayerId, position: LatLng) {
        if let Some(record) = self.layers.get_mut(&id) {
            record.position = position;
        }
    }

    fn set_icon(&mut self, id: LayerId, icon: &Icon) {
        if let Some(record) = self.layers.get_mut(&id) {
            record.icon = Some(icon.clone());
        }
    }

    fn bind_tooltip(&mut self, id: LayerId, tooltip: &Tooltip) {
        if let Some(record) = self.layers.get_mut(&id) {
            record.tooltip = Some(tooltip.clone());
        }
    }

    fn set_tooltip_content(&mut self, id: LayerId, text: &str) {
        if let Some(tooltip) = self.layers.get_mut(&id).and_then(|r| r.tooltip.as_mut()) {
            tooltip.text = text.to_string();
        }
    }

    fn unbind_tooltip(&mut self, id: LayerId) {
        if let Some(record) = self.layers.get_mut(&id) {
            record.tooltip = None;
        }
    }
}
