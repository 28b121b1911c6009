//! Remote-control front end for a self-hosted audiobook server.
//!
//! The crate is split the same way the application is: [`nav`] owns D-pad focus
//! and the screen/overlay stack, [`render`] turns views into frames, and [`shelf`]
//! holds the content layer (server calls, preferences, playback, views). The
//! [`driver`] module wires everything to a terminal.

pub mod driver;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod nav;
pub mod render;
pub mod shelf;
pub mod width;

pub use driver::{CliDriver, CliDriverError, DriverResult};
pub use error::{Result, ShelfError};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{MetricSnapshot, NavMetrics};
pub use nav::{
    ElementId, FocusableElement, KeyMap, NavEvent, NavInput, NavOutcome, Navigator, Overlay,
    RenderTicket, Scope, Screen,
};
pub use render::{RenderBoundary, RenderStatus, RendererSettings, TextRenderer, View};
pub use shelf::{ShelfAction, ShelfApp, ShelfConfig};
pub use width::display_width;
