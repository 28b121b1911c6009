//! Audiobook client content layer: server calls, persisted preferences, playback,
//! and the views drawn for each navigation scope.

pub mod api;
pub mod config;
pub mod format;
pub mod playback;
pub mod settings;
pub mod state;
pub mod views;

mod app;

pub use app::{CONNECT_BUTTON, SEARCH_BUTTON, ShelfApp};
pub use config::{DevConfig, DevLogin, DeviceProfile, ShelfConfig};
pub use state::{LoginForm, ShelfState, TextField};
pub use views::{ShelfAction, build_view};
