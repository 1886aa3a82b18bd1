//! User settings read from `<config_dir>/playlist-downloader/config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    api::ApiConfig,
    application::DEFAULT_DOWNLOAD_DELAY,
    domain::{AppError, FetchPolicy},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the playlist service
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Where videos are saved; the platform download folder when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Pause between two downloads of a batch, in milliseconds
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    #[serde(default)]
    pub fetch_policy: FetchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_base_url() -> String {
    ApiConfig::default().base_url
}

fn default_download_delay_ms() -> u64 {
    DEFAULT_DOWNLOAD_DELAY.as_millis() as u64
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            download_dir: None,
            download_delay_ms: default_download_delay_ms(),
            fetch_policy: FetchPolicy::default(),
        }
    }

    pub fn get_config_path() -> Result<PathBuf, AppError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?;
        Ok(config_dir.join("playlist-downloader").join("config.toml"))
    }

    /// Load the config file, or defaults when it does not exist.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
        }
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.download_delay(), Duration::from_millis(2000));
        assert_eq!(config.fetch_policy, FetchPolicy::LastResponseWins);
        assert!(config.download_dir.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            api_base_url = "http://media.local:9000"
            download_dir = "/tmp/videos"
            download_delay_ms = 500
            fetch_policy = "latest_request_only"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_config().base_url, "http://media.local:9000");
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/videos"));
        assert_eq!(config.download_delay(), Duration::from_millis(500));
        assert_eq!(config.fetch_policy, FetchPolicy::LatestRequestOnly);
    }

    #[test]
    fn test_config_partial_deserialization() {
        let config: Config = toml::from_str(r#"download_delay_ms = 0"#).unwrap();
        assert_eq!(config.download_delay_ms, 0);
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.fetch_policy, FetchPolicy::LastResponseWins);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = toml::from_str::<Config>(r#"fetch_policy = "whatever""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "download_delay_ms = \"soon\"").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
