use thiserror::Error;

use crate::shelf::api::ApiError;
use crate::shelf::playback::PlaybackError;
use crate::shelf::settings::SettingsError;

/// Unified result type for the shelf crate.
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Errors surfaced outside the navigation core.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("media api error: {0}")]
    Api(#[from] ApiError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("render backend error: {0}")]
    Render(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
