//! Draggable map pins with range overlays.
//!
//! Pins hold their own geometry and mirror it onto a [`DisplaySurface`]
//! supplied by the caller. Everything here runs on the caller's event loop
//! thread; the only deferred work is the drag-release grace delay, which the
//! loop drives through [`PinRegistry::poll`] or [`Pin::poll`].

pub mod attachment;
pub mod error;
pub mod icon;
pub mod marker;
pub mod pin;
pub mod registry;
pub mod surface;
pub mod timer;

pub use attachment::{ActivePolicy, AttachmentStrategy, CircleRole, RangeCircle, RangedPair};
pub use error::PinError;
pub use icon::Icon;
pub use marker::{Direction, Marker, Tooltip, TooltipOptions};
pub use pin::{DragState, Pin, PinEvent, PinId};
pub use registry::PinRegistry;
pub use surface::{DisplaySurface, HeadlessSurface, Layer, LayerId, LayerKind, LayerRecord};
pub use timer::GraceTimer;
