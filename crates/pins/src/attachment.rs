//! Range circles and the per-type strategy that manages them.
use postscriptum_shared::constants::{
    FOB_MAX_COLOR, FOB_MIN_COLOR, MORTAR_MAX_COLOR, MORTAR_MIN_COLOR, RANGE_FILL_OPACITY,
};
use postscriptum_shared::{AmmoVariant, LatLng, PinType, RangeConfig};

use crate::pin::PinId;
use crate::surface::{DisplaySurface, Layer, LayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleRole {
    Min,
    Max,
}

/// Non-interactive circle that follows its owning pin.
#[derive(Debug, Clone)]
pub struct RangeCircle {
    id: LayerId,
    owner: PinId,
    role: CircleRole,
    radius: f64,
    color: String,
    position: LatLng,
}

impl RangeCircle {
    fn new(owner: PinId, role: CircleRole, radius: f64, color: &str, position: LatLng) -> Self {
        RangeCircle {
            id: LayerId::new(),
            owner,
            role,
            radius,
            color: color.to_string(),
            position,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn owner(&self) -> PinId {
        self.owner
    }

    pub fn role(&self) -> CircleRole {
        self.role
    }

    /// Radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn fill_opacity(&self) -> f64 {
        RANGE_FILL_OPACITY
    }

    pub fn is_interactive(&self) -> bool {
        false
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    fn add_to(&self, surface: &mut dyn DisplaySurface) {
        if !surface.has_layer(self.id) {
            surface.add_layer(Layer::Circle(self));
        }
    }

    fn remove_from(&self, surface: &mut dyn DisplaySurface) {
        if surface.has_layer(self.id) {
            surface.remove_layer(self.id);
        }
    }

    fn set_position(&mut self, position: LatLng, surface: &mut dyn DisplaySurface) {
        self.position = position;
        if surface.has_layer(self.id) {
            surface.set_layer_position(self.id, position);
        }
    }
}

/// How a ranged pair reacts to its pin being (de)activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePolicy {
    /// Circles are shown only while the pin is active.
    Toggle,
    /// Circles are shown whenever the pin is on the surface.
    AlwaysShown,
}

/// A min and a max circle centered on the pin.
#[derive(Debug, Clone)]
pub struct RangedPair {
    circles: [RangeCircle; 2],
    policy: ActivePolicy,
}

impl RangedPair {
    pub fn min(&self) -> &RangeCircle {
        &self.circles[0]
    }

    pub fn max(&self) -> &RangeCircle {
        &self.circles[1]
    }

    pub fn policy(&self) -> ActivePolicy {
        self.policy
    }
}

/// Attachment behavior, chosen once from the pin type.
#[derive(Debug, Clone)]
pub enum AttachmentStrategy {
    Plain,
    RangedPair(RangedPair),
}

impl AttachmentStrategy {
    /// Build the attachments for a new pin. Radii are fixed from here on.
    pub fn for_pin(
        owner: PinId,
        pin_type: PinType,
        config: &RangeConfig,
        variant: &AmmoVariant,
        position: LatLng,
    ) -> Self {
        let pair = |min: (f64, &str), max: (f64, &str), policy| {
            AttachmentStrategy::RangedPair(RangedPair {
                circles: [
                    RangeCircle::new(owner, CircleRole::Min, min.0, min.1, position),
                    RangeCircle::new(owner, CircleRole::Max, max.0, max.1, position),
                ],
                policy,
            })
        };

        match pin_type {
            PinType::Mortar => pair(
                (config.mortar_min_distance, MORTAR_MIN_COLOR),
                (variant.max_distance, MORTAR_MAX_COLOR),
                ActivePolicy::Toggle,
            ),
            PinType::Fob => pair(
                (config.fob_build_range, FOB_MIN_COLOR),
                (config.fob_min_distance, FOB_MAX_COLOR),
                ActivePolicy::AlwaysShown,
            ),
            PinType::Target => AttachmentStrategy::Plain,
        }
    }

    pub fn circles(&self) -> &[RangeCircle] {
        match self {
            AttachmentStrategy::Plain => &[],
            AttachmentStrategy::RangedPair(pair) => &pair.circles,
        }
    }

    pub fn attach(&self, surface: &mut dyn DisplaySurface) {
        for circle in self.circles() {
            circle.add_to(surface);
        }
    }

    pub fn detach(&self, surface: &mut dyn DisplaySurface) {
        for circle in self.circles() {
            circle.remove_from(surface);
        }
    }

    pub fn on_move(&mut self, position: LatLng, surface: &mut dyn DisplaySurface) {
        if let AttachmentStrategy::RangedPair(pair) = self {
            for circle in pair.circles.iter_mut() {
                circle.set_position(position, surface);
            }
        }
    }

    pub fn on_active_change(&self, state: bool, surface: &mut dyn DisplaySurface) {
        match self {
            AttachmentStrategy::RangedPair(pair) if pair.policy == ActivePolicy::Toggle => {
                if state {
                    self.attach(surface);
                } else {
                    self.detach(surface);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use postscriptum_shared::constants::SENTINEL_POSITION;

    fn strategy(pin_type: PinType, variant: &str) -> AttachmentStrategy {
        let config = RangeConfig::default();
        let variant = config.variant(variant).unwrap().clone();
        AttachmentStrategy::for_pin(PinId::new(), pin_type, &config, &variant, SENTINEL_POSITION)
    }

    #[test]
    fn test_mortar_radii_follow_variant() {
        let s = strategy(PinType::Mortar, "standard");
        let radii: Vec<f64> = s.circles().iter().map(|c| c.radius()).collect();
        assert_eq!(radii, vec![50.0, 2610.0]);

        let s = strategy(PinType::Mortar, "ger");
        assert!((s.circles()[1].radius() - 1188.0).abs() < 1e-9);
    }

    #[test]
    fn test_fob_radii_and_colors() {
        let s = strategy(PinType::Fob, "standard");
        let AttachmentStrategy::RangedPair(pair) = &s else {
            panic!("fob should have a ranged pair");
        };
        assert!((pair.min().radius() - 150.0).abs() < 1e-9);
        assert!((pair.max().radius() - 400.0).abs() < 1e-9);
        assert_eq!(pair.min().color(), "#03A9F4");
        assert_eq!(pair.max().color(), "#2196F3");
        assert_eq!(pair.policy(), ActivePolicy::AlwaysShown);
    }

    #[test]
    fn test_target_is_plain() {
        let s = strategy(PinType::Target, "standard");
        assert!(matches!(s, AttachmentStrategy::Plain));
        assert!(s.circles().is_empty());
    }

    #[test]
    fn test_circles_are_not_interactive() {
        let s = strategy(PinType::Mortar, "standard");
        for c in s.circles() {
            assert!(!c.is_interactive());
            assert!((c.fill_opacity() - 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_on_move_keeps_circles_together() {
        let mut surface = HeadlessSurface::new();
        let mut s = strategy(PinType::Mortar, "standard");
        s.attach(&mut surface);
        let target = LatLng::new(-1200.5, 830.25);
        s.on_move(target, &mut surface);
        for c in s.circles() {
            assert_eq!(c.position(), target);
            assert_eq!(surface.layer(c.id()).unwrap().position, target);
        }
    }

    #[test]
    fn test_active_change_only_toggles_mortar() {
        let mut surface = HeadlessSurface::new();
        let mortar = strategy(PinType::Mortar, "standard");
        mortar.on_active_change(true, &mut surface);
        assert_eq!(surface.len(), 2);
        mortar.on_active_change(false, &mut surface);
        assert!(surface.is_empty());

        let fob = strategy(PinType::Fob, "standard");
        fob.attach(&mut surface);
        fob.on_active_change(false, &mut surface);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_owner_back_reference() {
        let owner = PinId::new();
        let config = RangeConfig::default();
        let variant = config.default_variant().unwrap().clone();
        let s =
            AttachmentStrategy::for_pin(owner, PinType::Fob, &config, &variant, SENTINEL_POSITION);
        assert!(s.circles().iter().all(|c| c.owner() == owner));
        assert_eq!(s.circles()[0].role(), CircleRole::Min);
        assert_eq!(s.circles()[1].role(), CircleRole::Max);
    }
}
