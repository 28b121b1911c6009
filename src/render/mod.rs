//! Render boundary: the content layer hands a [`View`] to a renderer, which reports
//! whether the frame is ready for focus registration.

mod core;

pub use core::{RenderBoundary, RenderStatus, RendererSettings, TextRenderer, View, frame_lines};
