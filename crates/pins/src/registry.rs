use std::collections::BTreeMap;

use instant::Instant;
use postscriptum_shared::{AmmoVariant, GridReference, PinType, RangeConfig};

use crate::error::PinError;
use crate::pin::{Pin, PinEvent, PinId};
use crate::surface::DisplaySurface;

/// The pins of one planning session.
///
/// Owns its own [`RangeConfig`], so independent sessions can use different
/// ammo tables. At most one mortar is active at a time.
#[derive(Debug)]
pub struct PinRegistry {
    config: RangeConfig,
    variant: AmmoVariant,
    pins: BTreeMap<PinId, Pin>,
    order: Vec<PinId>,
    active: Option<PinId>,
}

impl PinRegistry {
    pub fn new(config: RangeConfig) -> Result<Self, PinError> {
        config.validate()?;
        let variant = config.default_variant()?.clone();
        Ok(PinRegistry {
            config,
            variant,
            pins: BTreeMap::new(),
            order: Vec::new(),
            active: None,
        })
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    pub fn selected_variant(&self) -> &AmmoVariant {
        &self.variant
    }

    /// Choose the ammo variant for mortars created from now on. Existing
    /// pins keep the radii they were built with.
    pub fn select_variant(&mut self, name: &str) -> Result<(), PinError> {
        let variant = self.config.variant(name)?.clone();
        tracing::debug!(
            variant = %variant.name,
            max_distance = variant.max_distance,
            "Selected ammo variant"
        );
        self.variant = variant;
        Ok(())
    }

    pub fn create(&mut self, pin_type: PinType, pin_url: &str, symbol_url: &str) -> PinId {
        self.create_with_size(pin_type, pin_url, symbol_url, self.config.icon_size)
    }

    /// Create a pin from a type name coming off a form or a saved plan.
    pub fn create_by_name(
        &mut self,
        pin_type: &str,
        pin_url: &str,
        symbol_url: &str,
    ) -> Result<PinId, PinError> {
        let pin_type = pin_type.parse::<PinType>().map_err(|e| {
            tracing::warn!(error = %e, "Rejected pin type");
            e
        })?;
        Ok(self.create(pin_type, pin_url, symbol_url))
    }

    pub fn create_with_size(
        &mut self,
        pin_type: PinType,
        pin_url: &str,
        symbol_url: &str,
        size: u32,
    ) -> PinId {
        let pin = Pin::with_size(pin_type, pin_url, symbol_url, size, &self.config, &self.variant);
        let id = pin.id();
        self.pins.insert(id, pin);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    pub fn get_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins.get_mut(&id)
    }

    /// Pins in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.order.iter().filter_map(move |id| self.pins.get(id))
    }

    pub fn ids_of(&self, pin_type: PinType) -> Vec<PinId> {
        self.iter()
            .filter(|p| p.pin_type() == pin_type)
            .map(|p| p.id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Detach a pin and hand it back.
    pub fn remove(&mut self, id: PinId, surface: &mut dyn DisplaySurface) -> Option<Pin> {
        let mut pin = self.pins.remove(&id)?;
        self.order.retain(|p| *p != id);
        if self.active == Some(id) {
            self.active = None;
        }
        pin.detach(surface);
        tracing::debug!(pin = %id, pin_type = %pin.pin_type(), "Removed pin");
        Some(pin)
    }

    /// Detach and drop every pin.
    pub fn clear(&mut self, surface: &mut dyn DisplaySurface) {
        for id in std::mem::take(&mut self.order) {
            if let Some(mut pin) = self.pins.remove(&id) {
                pin.detach(surface);
            }
        }
        self.active = None;
    }

    pub fn active(&self) -> Option<PinId> {
        self.active
    }

    /// Make `id` the active mortar, deactivating the previous one.
    /// Returns false (and changes nothing) for unknown or non-mortar pins.
    pub fn activate(&mut self, id: PinId, surface: &mut dyn DisplaySurface) -> bool {
        match self.pins.get(&id) {
            Some(pin) if pin.pin_type() == PinType::Mortar => {}
            _ => return false,
        }

        if let Some(prev) = self.active.filter(|prev| *prev != id) {
            if let Some(pin) = self.pins.get_mut(&prev) {
                apply_active(pin, false, surface);
            }
        }
        if let Some(pin) = self.pins.get_mut(&id) {
            apply_active(pin, true, surface);
        }
        self.active = Some(id);
        true
    }

    pub fn deactivate_all(&mut self, surface: &mut dyn DisplaySurface) {
        if let Some(pin) = self.active.take().and_then(|id| self.pins.get_mut(&id)) {
            apply_active(pin, false, surface);
        }
    }

    /// Route a marker event to its pin. Unknown ids are ignored.
    pub fn dispatch(
        &mut self,
        id: PinId,
        event: PinEvent,
        surface: &mut dyn DisplaySurface,
        grid: &dyn GridReference,
        now: Instant,
    ) {
        match self.pins.get_mut(&id) {
            Some(pin) => pin.handle(event, surface, grid, now),
            None => tracing::warn!(pin = %id, ?event, "Dropped event for unknown pin"),
        }
    }

    /// Advance every pending grace timer. Returns how many drags settled.
    pub fn poll(&mut self, now: Instant, surface: &mut dyn DisplaySurface) -> usize {
        self.pins
            .values_mut()
            .map(|pin| pin.poll(now, surface))
            .filter(|settled| *settled)
            .count()
    }

    /// Whether a click on this pin is the one fired by a drag release.
    pub fn is_click_suppressed(&self, id: PinId) -> bool {
        self.pins.get(&id).map(|p| p.is_dragging()).unwrap_or(false)
    }
}

/// Circles only follow the active flag while the marker is on the surface.
fn apply_active(pin: &mut Pin, state: bool, surface: &mut dyn DisplaySurface) {
    if pin.is_attached(&*surface) {
        pin.set_active(state, surface);
    } else {
        pin.set_active_flag(state);
    }
}
