use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::logging::Logger;
use crate::nav::KeyMap;

use super::api::DeviceInfo;

/// Identity reported to the server when a playback session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub device_id: String,
    pub client_name: String,
    pub client_version: String,
    pub platform: String,
    pub model: String,
    pub device_name: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            device_id: format!("shelf-tv-{}", std::process::id()),
            client_name: "Shelf TV".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: "terminal".to_string(),
            model: "TV".to_string(),
            device_name: "Shelf TV".to_string(),
        }
    }
}

impl DeviceProfile {
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            device_id: self.device_id.clone(),
            client_name: self.client_name.clone(),
            client_version: self.client_version.clone(),
            platform: self.platform.clone(),
            model: self.model.clone(),
            device_name: self.device_name.clone(),
        }
    }
}

/// Application-level runtime knobs.
#[derive(Clone)]
pub struct ShelfConfig {
    /// Driver poll timeout; each expiry advances playback and timers.
    pub tick_interval: Duration,
    pub sync_interval: Duration,
    /// Seconds reported as listened with every periodic sync.
    pub sync_listened_secs: f64,
    pub continue_limit: u32,
    pub metrics_interval: Duration,
    pub device: DeviceProfile,
    pub key_map: KeyMap,
    pub logger: Option<Logger>,
    /// Development auto-login file, read once on start.
    pub dev_config_path: Option<PathBuf>,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            sync_interval: Duration::from_secs(30),
            sync_listened_secs: 30.0,
            continue_limit: 10,
            metrics_interval: Duration::from_secs(5),
            device: DeviceProfile::default(),
            key_map: KeyMap::default(),
            logger: None,
            dev_config_path: None,
        }
    }
}

/// Credentials for unattended sign-in during development.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevLogin {
    ApiKey {
        host: String,
        api_key: String,
    },
    Password {
        host: String,
        username: String,
        password: String,
    },
}

impl DevConfig {
    /// `Ok(None)` when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// API key wins over username/password. Missing host or credentials yield `None`.
    pub fn login(&self) -> Option<DevLogin> {
        let host = self.host.clone().filter(|host| !host.trim().is_empty())?;
        if let Some(api_key) = self.api_key.clone().filter(|key| !key.is_empty()) {
            return Some(DevLogin::ApiKey { host, api_key });
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(DevLogin::Password {
                    host,
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => None,
        }
    }
}
