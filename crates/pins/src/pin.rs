use instant::Instant;
use postscriptum_shared::constants::{GRACE_DELAY, SENTINEL_POSITION};
use postscriptum_shared::{AmmoVariant, GridReference, LatLng, PinType, RangeConfig};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::{AttachmentStrategy, RangeCircle};
use crate::icon::Icon;
use crate::marker::{Marker, Tooltip, TooltipOptions};
use crate::surface::DisplaySurface;
use crate::timer::GraceTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(Uuid);

impl PinId {
    pub fn new() -> Self {
        PinId(Uuid::new_v4())
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Interaction events the map widget delivers for a pin's marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinEvent {
    DragStart,
    Drag(LatLng),
    DragEnd,
}

/// A draggable map marker plus whatever overlays its type carries.
///
/// Pins start detached at [`SENTINEL_POSITION`]. All mutation goes through
/// `&mut self`, so the marker and its range circles are always moved in the
/// same call and nobody can observe them apart.
#[derive(Debug)]
pub struct Pin {
    id: PinId,
    pin_type: PinType,
    pin_url: String,
    symbol_url: String,
    base_size: u32,
    marker: Marker,
    attachments: AttachmentStrategy,
    active: bool,
    drag: DragState,
    grace: GraceTimer,
}

impl Pin {
    /// New detached pin with the default icon size.
    pub fn new(
        pin_type: PinType,
        pin_url: &str,
        symbol_url: &str,
        config: &RangeConfig,
        variant: &AmmoVariant,
    ) -> Self {
        Self::with_size(pin_type, pin_url, symbol_url, config.icon_size, config, variant)
    }

    pub fn with_size(
        pin_type: PinType,
        pin_url: &str,
        symbol_url: &str,
        size: u32,
        config: &RangeConfig,
        variant: &AmmoVariant,
    ) -> Self {
        let id = PinId::new();
        let icon = Icon::scaled(pin_url, size, config.icon_size);
        let attachments =
            AttachmentStrategy::for_pin(id, pin_type, config, variant, SENTINEL_POSITION);

        tracing::debug!(
            pin = %id,
            pin_type = %pin_type,
            size,
            variant = %variant.name,
            circles = attachments.circles().len(),
            "Created pin"
        );

        Pin {
            id,
            pin_type,
            pin_url: pin_url.to_string(),
            symbol_url: symbol_url.to_string(),
            base_size: config.icon_size,
            marker: Marker::new(SENTINEL_POSITION, icon),
            attachments,
            active: false,
            drag: DragState::Idle,
            grace: GraceTimer::new(GRACE_DELAY),
        }
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn pin_type(&self) -> PinType {
        self.pin_type
    }

    pub fn pin_url(&self) -> &str {
        &self.pin_url
    }

    pub fn symbol_url(&self) -> &str {
        &self.symbol_url
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn icon(&self) -> &Icon {
        self.marker.icon()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.marker.tooltip()
    }

    pub fn attachments(&self) -> &AttachmentStrategy {
        &self.attachments
    }

    /// Empty for targets; min then max circle for mortars and FOBs.
    pub fn range_circles(&self) -> &[RangeCircle] {
        self.attachments.circles()
    }

    pub fn position(&self) -> LatLng {
        self.marker.position()
    }

    pub fn size(&self) -> u32 {
        self.marker.icon().size()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// True from drag start until the grace delay after drag end has passed.
    /// Click handlers check this to ignore the click fired on release.
    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Drag has ended but the grace delay is still running.
    pub fn is_releasing(&self) -> bool {
        self.grace.is_armed()
    }

    pub fn is_attached(&self, surface: &dyn DisplaySurface) -> bool {
        self.marker.is_on(surface)
    }

    /// Put the marker (and for mortars and FOBs, both circles) on `surface`.
    pub fn attach(&self, surface: &mut dyn DisplaySurface) {
        self.marker.add_to(surface);
        self.attachments.attach(surface);
        tracing::debug!(pin = %self.id, pin_type = %self.pin_type, "Attached pin");
    }

    /// Take the marker and any circles off `surface`. A pending grace timer
    /// is cancelled and the drag settled, so nothing fires for a removed pin.
    pub fn detach(&mut self, surface: &mut dyn DisplaySurface) {
        if self.grace.cancel() {
            tracing::debug!(pin = %self.id, "Cancelled drag grace timer");
        }
        self.finish_drag(surface);
        self.marker.remove_from(surface);
        self.attachments.detach(surface);
        tracing::debug!(pin = %self.id, pin_type = %self.pin_type, "Detached pin");
    }

    pub fn set_position(&mut self, position: LatLng, surface: &mut dyn DisplaySurface) {
        self.marker.set_position(position, surface);
        self.attachments.on_move(position, surface);
    }

    /// Swap in a new icon of `size` pixels.
    pub fn set_size(&mut self, size: u32, surface: &mut dyn DisplaySurface) {
        let icon = Icon::scaled(&self.pin_url, size, self.base_size);
        self.marker.set_icon(icon, surface);
    }

    /// Only mortars react: their circles are shown while active and hidden
    /// otherwise. FOB circles stay up whenever the pin is attached.
    pub fn set_active(&mut self, state: bool, surface: &mut dyn DisplaySurface) {
        self.active = state;
        self.attachments.on_active_change(state, surface);
        tracing::debug!(
            pin = %self.id,
            pin_type = %self.pin_type,
            active = state,
            "Set pin active"
        );
    }

    /// Record `state` without touching any surface, for pins not on the map.
    pub(crate) fn set_active_flag(&mut self, state: bool) {
        self.active = state;
    }

    pub fn on_drag_start(&mut self, surface: &mut dyn DisplaySurface) {
        // a new drag during the grace window supersedes the pending release
        self.grace.cancel();
        self.drag = DragState::Dragging;
        self.marker.bind_tooltip(
            Tooltip {
                text: String::new(),
                options: TooltipOptions::drag_label(self.base_size),
            },
            surface,
        );
    }

    pub fn on_drag(
        &mut self,
        position: LatLng,
        surface: &mut dyn DisplaySurface,
        grid: &dyn GridReference,
    ) {
        self.set_position(position, surface);
        let label = grid.to_grid_reference(position.lat, position.lng);
        tracing::trace!(pin = %self.id, %position, label = %label, "Dragged pin");
        self.marker.set_tooltip_content(&label, surface);
    }

    /// Drag state is kept until [`Pin::poll`] sees the grace delay expire.
    pub fn on_drag_end(&mut self, now: Instant) {
        if self.drag == DragState::Dragging {
            self.grace.arm(now);
        }
    }

    /// Settle a released drag once its grace delay has run out.
    /// Returns true if the pin went back to idle.
    pub fn poll(&mut self, now: Instant, surface: &mut dyn DisplaySurface) -> bool {
        if self.grace.fire_if_due(now) {
            self.finish_drag(surface);
            true
        } else {
            false
        }
    }

    pub fn handle(
        &mut self,
        event: PinEvent,
        surface: &mut dyn DisplaySurface,
        grid: &dyn GridReference,
        now: Instant,
    ) {
        match event {
            PinEvent::DragStart => self.on_drag_start(surface),
            PinEvent::Drag(position) => self.on_drag(position, surface, grid),
            PinEvent::DragEnd => self.on_drag_end(now),
        }
    }

    fn finish_drag(&mut self, surface: &mut dyn DisplaySurface) {
        self.drag = DragState::Idle;
        self.marker.unbind_tooltip(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use postscriptum_shared::KeypadGrid;
    use std::time::Duration;

    fn pin(pin_type: PinType) -> Pin {
        let config = RangeConfig::default();
        let variant = config.default_variant().unwrap().clone();
        Pin::new(pin_type, "/img/icons/pin.png", "/img/icons/symbol.png", &config, &variant)
    }

    fn layer_ids(pin: &Pin) -> Vec<crate::surface::LayerId> {
        std::iter::once(pin.marker().id())
            .chain(pin.range_circles().iter().map(|c| c.id()))
            .collect()
    }

    #[test]
    fn test_new_pin_is_detached_at_sentinel() {
        let surface = HeadlessSurface::new();
        for t in PinType::ALL {
            let p = pin(t);
            assert_eq!(p.position(), SENTINEL_POSITION);
            assert!(!p.is_attached(&surface));
            assert!(!p.is_dragging());
            assert!(!p.is_active());
            assert_eq!(p.size(), 48);
            assert!(p.range_circles().iter().all(|c| c.position() == SENTINEL_POSITION));
        }
    }

    #[test]
    fn test_attachment_counts_by_type() {
        assert_eq!(pin(PinType::Mortar).range_circles().len(), 2);
        assert_eq!(pin(PinType::Fob).range_circles().len(), 2);
        assert!(pin(PinType::Target).range_circles().is_empty());
    }

    #[test]
    fn test_set_position_moves_attachments() {
        let mut surface = HeadlessSurface::new();
        for t in [PinType::Mortar, PinType::Fob] {
            let mut p = pin(t);
            p.attach(&mut surface);
            let target = LatLng::new(-2345.678, 1234.5);
            p.set_position(target, &mut surface);
            assert_eq!(p.position(), target);
            for c in p.range_circles() {
                assert_eq!(c.position(), target);
                assert_eq!(surface.layer(c.id()).unwrap().position, target);
            }
            assert_eq!(surface.layer(p.marker().id()).unwrap().position, target);
        }
    }

    #[test]
    fn test_set_position_while_detached() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Mortar);
        let target = LatLng::new(-10.0, 10.0);
        p.set_position(target, &mut surface);
        assert!(surface.is_empty());
        assert!(p.range_circles().iter().all(|c| c.position() == target));

        p.attach(&mut surface);
        for id in layer_ids(&p) {
            assert_eq!(surface.layer(id).unwrap().position, target);
        }
    }

    #[test]
    fn test_attach_then_detach_leaves_nothing() {
        let mut surface = HeadlessSurface::new();
        for t in PinType::ALL {
            let mut p = pin(t);
            p.attach(&mut surface);
            assert!(layer_ids(&p).iter().all(|id| surface.has_layer(*id)));
            p.detach(&mut surface);
            assert!(layer_ids(&p).iter().all(|id| !surface.has_layer(*id)));
        }
        assert!(surface.is_empty());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut surface = HeadlessSurface::new();
        let p = pin(PinType::Fob);
        p.attach(&mut surface);
        p.attach(&mut surface);
        for id in layer_ids(&p) {
            assert_eq!(surface.add_count(id), 1);
        }
        assert_eq!(surface.len(), 3);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Mortar);
        p.detach(&mut surface);
        p.attach(&mut surface);
        p.detach(&mut surface);
        p.detach(&mut surface);
        assert!(surface.is_empty());
    }

    #[test]
    fn test_set_active_toggles_mortar_circles() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Mortar);
        p.attach(&mut surface);

        p.set_active(false, &mut surface);
        assert!(surface.has_layer(p.marker().id()));
        assert!(p.range_circles().iter().all(|c| !surface.has_layer(c.id())));

        p.set_active(true, &mut surface);
        assert!(p.is_active());
        assert!(p.range_circles().iter().all(|c| surface.has_layer(c.id())));
        // re-activation reuses the same circles
        p.set_active(true, &mut surface);
        for c in p.range_circles() {
            assert_eq!(surface.add_count(c.id()), 2);
        }
    }

    #[test]
    fn test_set_active_is_noop_for_target() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Target);
        p.attach(&mut surface);
        p.set_active(true, &mut surface);
        assert_eq!(surface.len(), 1);
        p.set_active(false, &mut surface);
        assert_eq!(surface.len(), 1);
        assert!(p.is_attached(&surface));
    }

    #[test]
    fn test_fob_circles_ignore_active() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Fob);
        p.attach(&mut surface);
        p.set_active(false, &mut surface);
        assert!(p.range_circles().iter().all(|c| surface.has_layer(c.id())));
    }

    #[test]
    fn test_set_size_regenerates_icon() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Target);
        p.attach(&mut surface);
        p.set_size(96, &mut surface);
        assert_eq!(p.size(), 96);
        assert_eq!(p.icon().icon_anchor, (48.0, 8.0));
        assert_eq!(p.icon().popup_anchor, (0.0, -24.0));
        let mirrored = surface.layer(p.marker().id()).unwrap().icon.clone().unwrap();
        assert_eq!(mirrored.size(), 96);
        assert_eq!(mirrored.icon_url, "/img/icons/pin.png");
    }

    #[test]
    fn test_drag_sequence_with_grace_delay() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Mortar);
        p.attach(&mut surface);
        let start = Instant::now();

        p.handle(PinEvent::DragStart, &mut surface, &KeypadGrid, start);
        assert!(p.is_dragging());
        let label = p.tooltip().unwrap();
        assert!(label.options.permanent);
        assert_eq!(label.options.offset, (0.0, -48.0));
        assert_eq!(label.text, "");

        let target = LatLng::new(-150.0, 150.0);
        p.handle(PinEvent::Drag(target), &mut surface, &KeypadGrid, start);
        assert_eq!(p.position(), target);
        assert!(p.range_circles().iter().all(|c| c.position() == target));
        assert_eq!(p.tooltip().unwrap().text, "A1-5-5");
        let mirrored = surface.layer(p.marker().id()).unwrap();
        assert_eq!(mirrored.tooltip.as_ref().unwrap().text, "A1-5-5");

        let released = start + Duration::from_millis(100);
        p.handle(PinEvent::DragEnd, &mut surface, &KeypadGrid, released);
        assert!(p.is_dragging());
        assert!(p.is_releasing());

        assert!(!p.poll(released + Duration::from_millis(5), &mut surface));
        assert!(p.is_dragging());
        assert!(p.tooltip().is_some());

        assert!(p.poll(released + GRACE_DELAY, &mut surface));
        assert!(!p.is_dragging());
        assert!(p.tooltip().is_none());
        assert!(surface.layer(p.marker().id()).unwrap().tooltip.is_none());
    }

    #[test]
    fn test_detach_during_grace_cancels_timer() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Fob);
        p.attach(&mut surface);
        let start = Instant::now();

        p.on_drag_start(&mut surface);
        p.on_drag(LatLng::new(-10.0, 10.0), &mut surface, &KeypadGrid);
        p.on_drag_end(start);
        p.detach(&mut surface);

        assert!(!p.is_releasing());
        assert!(!p.is_dragging());
        assert!(!p.poll(start + Duration::from_secs(1), &mut surface));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_new_drag_during_grace_keeps_dragging() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Target);
        p.attach(&mut surface);
        let start = Instant::now();

        p.on_drag_start(&mut surface);
        p.on_drag_end(start);
        p.on_drag_start(&mut surface);
        assert!(!p.poll(start + Duration::from_secs(1), &mut surface));
        assert!(p.is_dragging());
    }

    #[test]
    fn test_drag_end_without_start_is_ignored() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Target);
        p.on_drag_end(Instant::now());
        assert!(!p.is_releasing());
        assert!(!p.poll(Instant::now() + Duration::from_secs(1), &mut surface));
    }

    #[test]
    fn test_drag_uses_supplied_grid_reference() {
        let mut surface = HeadlessSurface::new();
        let mut p = pin(PinType::Target);
        p.attach(&mut surface);
        let grid = |lat: f64, lng: f64| format!("{:.0}:{:.0}", lat, lng);

        p.on_drag_start(&mut surface);
        p.on_drag(LatLng::new(-12.0, 34.0), &mut surface, &grid);
        assert_eq!(p.tooltip().unwrap().text, "-12:34");
    }

    #[test]
    fn test_mortar_radius_follows_variant() {
        let config = RangeConfig::default();
        let br2 = config.variant("br2").unwrap().clone();
        let p = Pin::new(PinType::Mortar, "/a.png", "/b.png", &config, &br2);
        assert!((p.range_circles()[0].radius() - 50.0).abs() < 1e-9);
        assert!((p.range_circles()[1].radius() - 1467.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_size() {
        let config = RangeConfig::default();
        let variant = config.default_variant().unwrap().clone();
        let p = Pin::with_size(PinType::Target, "/a.png", "/b.png", 96, &config, &variant);
        assert_eq!(p.size(), 96);
        assert_eq!(p.pin_url(), "/a.png");
        assert_eq!(p.symbol_url(), "/b.png");
        assert_eq!(p.icon().icon_anchor, (48.0, 8.0));
    }
}
