//! Persistent settings boundary plus the typed records stored through it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const KEY_HOST_URL: &str = "hostUrl";
pub const KEY_API_TOKEN: &str = "apiToken";
pub const KEY_AUTH_TYPE: &str = "authType";
pub const KEY_SELECTED_LIBRARIES: &str = "selectedLibraryIds";
pub const KEY_CURRENT_LIBRARY: &str = "currentLibraryId";
pub const KEY_SETTINGS: &str = "settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Key/value store for JSON values. Missing keys read as `None`.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> SettingsResult<()>;
    fn remove(&mut self, key: &str) -> SettingsResult<()>;
    fn clear(&mut self) -> SettingsResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SettingsResult<()> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> SettingsResult<()> {
        self.values.clear();
        Ok(())
    }
}

/// Whole-file JSON object store, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file is missing or unreadable as JSON.
    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> SettingsResult<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> SettingsResult<()> {
        self.values.clear();
        self.persist()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    #[default]
    #[serde(rename = "username")]
    Username,
    #[serde(rename = "apikey")]
    ApiKey,
}

impl AuthType {
    pub fn label(self) -> &'static str {
        match self {
            AuthType::Username => "Username / Password",
            AuthType::ApiKey => "API Key",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub host_url: String,
    pub api_token: String,
    pub auth_type: AuthType,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.host_url.is_empty() && !self.api_token.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressColor {
    #[default]
    Yellow,
    Red,
    Green,
    Blue,
    Purple,
    Orange,
    Pink,
    Teal,
}

impl ProgressColor {
    pub const ALL: [ProgressColor; 8] = [
        ProgressColor::Yellow,
        ProgressColor::Red,
        ProgressColor::Green,
        ProgressColor::Blue,
        ProgressColor::Purple,
        ProgressColor::Orange,
        ProgressColor::Pink,
        ProgressColor::Teal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgressColor::Yellow => "Yellow",
            ProgressColor::Red => "Red",
            ProgressColor::Green => "Green",
            ProgressColor::Blue => "Blue",
            ProgressColor::Purple => "Purple",
            ProgressColor::Orange => "Orange",
            ProgressColor::Pink => "Pink",
            ProgressColor::Teal => "Teal",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ProgressColor::Yellow => "#ffeb3b",
            ProgressColor::Red => "#f44336",
            ProgressColor::Green => "#4caf50",
            ProgressColor::Blue => "#2196f3",
            ProgressColor::Purple => "#BB86FC",
            ProgressColor::Orange => "#FF9800",
            ProgressColor::Pink => "#E91E63",
            ProgressColor::Teal => "#009688",
        }
    }

    /// Truecolor ANSI foreground for terminal progress bars.
    pub fn ansi(self) -> String {
        let hex = self.hex().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .unwrap_or(0)
        };
        format!("\x1b[38;2;{};{};{}m", channel(0..2), channel(2..4), channel(4..6))
    }
}

pub const ITEM_LIMIT_RANGE: (u32, u32) = (5, 50);
pub const SPEED_RANGE: (f64, f64) = (0.5, 3.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub item_limit: u32,
    pub playback_speed: f64,
    pub progress_bar_color: ProgressColor,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            item_limit: 20,
            playback_speed: 1.0,
            progress_bar_color: ProgressColor::Yellow,
        }
    }
}

impl AppSettings {
    pub fn adjust_item_limit(&mut self, delta: i32) {
        let (min, max) = ITEM_LIMIT_RANGE;
        let next = (self.item_limit as i64 + delta as i64).clamp(min as i64, max as i64);
        self.item_limit = next as u32;
    }

    /// Step the speed by `tenths` of 1x, clamped and rounded to one decimal.
    pub fn adjust_speed(&mut self, tenths: i32) {
        let (min, max) = SPEED_RANGE;
        let next = (self.playback_speed + tenths as f64 * 0.1).clamp(min, max);
        self.playback_speed = (next * 10.0).round() / 10.0;
    }
}

/// Typed accessors over any [`SettingsStore`]. Missing or undecodable values read as
/// their defaults.
pub trait Preferences: SettingsStore {
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(default)
    }

    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> SettingsResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value)
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            host_url: self.get_or(KEY_HOST_URL, String::new()),
            api_token: self.get_or(KEY_API_TOKEN, String::new()),
            auth_type: self.get_or(KEY_AUTH_TYPE, AuthType::Username),
        }
    }

    fn save_credentials(&mut self, credentials: &Credentials) -> SettingsResult<()> {
        self.put(KEY_HOST_URL, &credentials.host_url)?;
        self.put(KEY_API_TOKEN, &credentials.api_token)?;
        self.put(KEY_AUTH_TYPE, &credentials.auth_type)
    }

    fn clear_credentials(&mut self) -> SettingsResult<()> {
        self.remove(KEY_HOST_URL)?;
        self.remove(KEY_API_TOKEN)?;
        self.remove(KEY_AUTH_TYPE)
    }

    fn selected_libraries(&self) -> Vec<String> {
        self.get_or(KEY_SELECTED_LIBRARIES, Vec::new())
    }

    fn save_selected_libraries(&mut self, ids: &[String]) -> SettingsResult<()> {
        self.put(KEY_SELECTED_LIBRARIES, &ids)
    }

    fn current_library(&self) -> Option<String> {
        self.get_or(KEY_CURRENT_LIBRARY, None)
    }

    fn save_current_library(&mut self, id: &str) -> SettingsResult<()> {
        self.put(KEY_CURRENT_LIBRARY, &id)
    }

    fn app_settings(&self) -> AppSettings {
        self.get_or(KEY_SETTINGS, AppSettings::default())
    }

    fn save_app_settings(&mut self, settings: &AppSettings) -> SettingsResult<()> {
        self.put(KEY_SETTINGS, settings)
    }
}

impl<S: SettingsStore + ?Sized> Preferences for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_to_missing_and_garbled_values() {
        let mut store = MemoryStore::new();
        assert_eq!(store.app_settings(), AppSettings::default());
        assert_eq!(store.credentials(), Credentials::default());
        assert!(store.selected_libraries().is_empty());
        assert_eq!(store.current_library(), None);

        store.set(KEY_SETTINGS, json!("not an object")).unwrap();
        store.set(KEY_SELECTED_LIBRARIES, json!(42)).unwrap();
        assert_eq!(store.app_settings(), AppSettings::default());
        assert!(store.selected_libraries().is_empty());
    }

    #[test]
    fn settings_use_camel_case_keys() {
        let mut store = MemoryStore::new();
        let settings = AppSettings {
            item_limit: 25,
            playback_speed: 1.5,
            progress_bar_color: ProgressColor::Teal,
        };
        store.save_app_settings(&settings).unwrap();
        assert_eq!(
            store.get(KEY_SETTINGS),
            Some(json!({"itemLimit": 25, "playbackSpeed": 1.5, "progressBarColor": "Teal"}))
        );
        assert_eq!(store.app_settings(), settings);
    }

    #[test]
    fn credentials_round_trip_and_clear() {
        let mut store = MemoryStore::new();
        let creds = Credentials {
            host_url: "http://shelf.local".to_string(),
            api_token: "key".to_string(),
            auth_type: AuthType::ApiKey,
        };
        store.save_credentials(&creds).unwrap();
        assert_eq!(store.get(KEY_AUTH_TYPE), Some(json!("apikey")));
        assert!(store.credentials().is_complete());
        store.save_current_library("lib-1").unwrap();
        store.clear_credentials().unwrap();
        assert!(!store.credentials().is_complete());
        assert_eq!(store.current_library(), Some("lib-1".to_string()));
    }

    #[test]
    fn item_limit_and_speed_clamp() {
        let mut settings = AppSettings::default();
        for _ in 0..10 {
            settings.adjust_item_limit(5);
        }
        assert_eq!(settings.item_limit, 50);
        for _ in 0..20 {
            settings.adjust_item_limit(-5);
        }
        assert_eq!(settings.item_limit, 5);

        settings.adjust_speed(1);
        settings.adjust_speed(1);
        settings.adjust_speed(1);
        assert_eq!(settings.playback_speed, 1.3);
        for _ in 0..30 {
            settings.adjust_speed(1);
        }
        assert_eq!(settings.playback_speed, 3.0);
        for _ in 0..30 {
            settings.adjust_speed(-1);
        }
        assert_eq!(settings.playback_speed, 0.5);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store
                .save_selected_libraries(&["lib-1".to_string(), "lib-2".to_string()])
                .unwrap();
        }
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.selected_libraries(), vec!["lib-1", "lib-2"]);
        store.clear().unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.selected_libraries().is_empty());
    }

    #[test]
    fn file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.app_settings(), AppSettings::default());
    }

    #[test]
    fn colors_render_as_truecolor() {
        assert_eq!(ProgressColor::Red.ansi(), "\x1b[38;2;244;67;54m");
        assert_eq!(ProgressColor::ALL.len(), 8);
    }
}
