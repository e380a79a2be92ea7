//! Application configuration: a JSON file in the config directory plus a few
//! environment overrides. Every field has a default, so a missing file is fine.

use crate::constants::{
    DEFAULT_BACKEND_URL, DEFAULT_CONTAINER_HEIGHT, DEFAULT_CONTAINER_WIDTH,
    DEFAULT_REQUEST_TIMEOUT_SECS, MIN_CONTAINER_HEIGHT, MIN_CONTAINER_WIDTH,
};
use crate::error::{DeskError, DeskResult};
use eframe::egui::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "CASCLOUD_BACKEND_URL";
pub const ENV_USER_ID: &str = "CASCLOUD_USER_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub container_width: f32,
    pub container_height: f32,
    pub request_timeout_secs: u64,
    /// Seeds the session's user id; the desk itself never needs it for I/O.
    pub user_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_id: None,
        }
    }
}

impl AppConfig {
    /// Reads the config file, falling back to defaults when it is missing or broken,
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Self {
        let file_config = match path.map(Self::read_file) {
            Some(Ok(Some(config))) => Some(config),
            Some(Ok(None)) | None => None,
            Some(Err(err)) => {
                log::warn!("{err}; using default config");
                None
            }
        };
        let mut config = file_config.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitize();
        config
    }

    fn read_file(path: &Path) -> DeskResult<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(DeskError::Config {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| DeskError::Config {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(user) = lookup(ENV_USER_ID).filter(|v| !v.trim().is_empty()) {
            self.user_id = Some(user);
        }
    }

    fn sanitize(&mut self) {
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
        if !self.container_width.is_finite() || self.container_width < MIN_CONTAINER_WIDTH {
            self.container_width = DEFAULT_CONTAINER_WIDTH;
        }
        if !self.container_height.is_finite() || self.container_height < MIN_CONTAINER_HEIGHT {
            self.container_height = DEFAULT_CONTAINER_HEIGHT;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
    }

    pub fn container_size(&self) -> Vec2 {
        vec2(self.container_width, self.container_height)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::read_file(&dir.path().join("config.json")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "backend_url": "http://desk.local:9000/" }"#).unwrap();

        let mut config = AppConfig::read_file(&path).unwrap().unwrap();
        config.sanitize();
        assert_eq!(config.backend_url, "http://desk.local:9000");
        assert_eq!(config.container_width, DEFAULT_CONTAINER_WIDTH);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::read_file(&path),
            Err(DeskError::Config { .. })
        ));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_BACKEND_URL => Some("https://api.example.com".to_string()),
            ENV_USER_ID => Some("u-42".to_string()),
            _ => None,
        });
        assert_eq!(config.backend_url, "https://api.example.com");
        assert_eq!(config.user_id.as_deref(), Some("u-42"));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_sanitize_rejects_tiny_container() {
        let mut config = AppConfig {
            container_width: 10.0,
            container_height: f32::NAN,
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        config.sanitize();
        assert_eq!(config.container_width, DEFAULT_CONTAINER_WIDTH);
        assert_eq!(config.container_height, DEFAULT_CONTAINER_HEIGHT);
        assert_eq!(config.request_timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }
}
