//! D-pad focus navigation.
//!
//! The navigator owns the screen, the overlay stack, and the focused element. The
//! content layer describes what is drawn as [`FocusableElement`]s and receives
//! activations back as [`NavEvent`]s; it never moves focus itself.

mod context;
mod element;
mod flight;
mod input;
mod layout;
mod machine;
mod policy;
mod registry;
mod transition;

#[cfg(test)]
pub(crate) mod fixtures;

pub use context::{
    ModalKind, NavigationContext, Overlay, OverlayLayer, RenderTicket, Scope, Screen,
};
pub use element::{ElementId, ElementRole, FocusableElement, Region};
pub use flight::SingleFlight;
pub use input::{
    Direction, KEY_BACK, KEY_BACKSPACE, KEY_DOWN, KEY_ENTER, KEY_LEFT, KEY_RIGHT, KEY_UP,
    KeyMap, NavInput, from_key_event,
};
pub use layout::{RegionLayout, accepts_region, layout_for};
pub use machine::{METRICS_TARGET, NavConfig, NavEvent, NavOutcome, Navigator};
pub use policy::{CarouselRows, Move, resolve};
pub use registry::{FocusRegistry, compute_focusables};
