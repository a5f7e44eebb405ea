// Configuration management for the BetaDrop CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/betadrop/config.json
// - Linux: ~/.config/betadrop/config.json
// - Windows: %APPDATA%\betadrop\config.json

use anyhow::{Context, Result};
use betadrop_core::{ClientConfig, SizeLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API root
    pub api_base_url: String,

    /// Storage path for client state (device id)
    pub storage_path: Option<String>,

    /// Default length of generated share tokens
    pub token_length: usize,

    /// Local manifest server settings
    pub server: ServerConfig,

    /// Backend client settings
    pub client: ClientSettings,

    /// Upload ceilings in MB
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for `betadrop serve`
    pub listen_port: u16,

    /// Externally reachable HTTPS origin of the server, used in install links
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Seconds a cached query stays fresh
    pub cache_stale_secs: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub ios_max_mb: u64,
    pub android_max_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.betadrop.app/api".to_string(),
            storage_path: None,
            token_length: betadrop_core::DEFAULT_TOKEN_LENGTH,
            server: ServerConfig::default(),
            client: ClientSettings::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 8787,
            public_base_url: "https://localhost:8787".to_string(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            cache_stale_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            ios_max_mb: 512,
            android_max_mb: 512,
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("betadrop");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the data directory path (cross-platform)
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to determine data directory")?
            .join("betadrop");

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(data_dir)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load config from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Directory holding the client's sled store
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(Self::data_dir()?.join("storage")),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            stale_time: Duration::from_secs(self.client.cache_stale_secs),
            request_timeout: Duration::from_secs(self.client.request_timeout_secs),
            size_limits: self.size_limits(),
        }
    }

    pub fn size_limits(&self) -> SizeLimits {
        SizeLimits::from_mb(self.limits.ios_max_mb, self.limits.android_max_mb)
    }

    /// Set a config value (in memory; call `save` to persist)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_base_url" => {
                if value.is_empty() {
                    anyhow::bail!("api_base_url cannot be empty");
                }
                self.api_base_url = value.to_string();
            }
            "storage_path" => {
                self.storage_path = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "token_length" => {
                let length: usize = value.parse().context("Invalid number")?;
                if !(betadrop_core::token::MIN_TOKEN_LENGTH..=betadrop_core::token::MAX_TOKEN_LENGTH)
                    .contains(&length)
                {
                    anyhow::bail!("token_length must be between 6 and 20");
                }
                self.token_length = length;
            }
            "listen_port" => {
                self.server.listen_port = value.parse().context("Invalid port number")?;
            }
            "public_base_url" => {
                self.server.public_base_url = value.trim_end_matches('/').to_string();
            }
            "cache_stale_secs" => {
                self.client.cache_stale_secs = value.parse().context("Invalid number")?;
            }
            "request_timeout_secs" => {
                self.client.request_timeout_secs = value.parse().context("Invalid number")?;
            }
            "ios_max_mb" => {
                self.limits.ios_max_mb = value.parse().context("Invalid number")?;
            }
            "android_max_mb" => {
                self.limits.android_max_mb = value.parse().context("Invalid number")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api_base_url" => Some(self.api_base_url.clone()),
            "storage_path" => self.storage_path.clone(),
            "token_length" => Some(self.token_length.to_string()),
            "listen_port" => Some(self.server.listen_port.to_string()),
            "public_base_url" => Some(self.server.public_base_url.clone()),
            "cache_stale_secs" => Some(self.client.cache_stale_secs.to_string()),
            "request_timeout_secs" => Some(self.client.request_timeout_secs.to_string()),
            "ios_max_mb" => Some(self.limits.ios_max_mb.to_string()),
            "android_max_mb" => Some(self.limits.android_max_mb.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("api_base_url".to_string(), self.api_base_url.clone()),
            (
                "storage_path".to_string(),
                self.storage_path
                    .clone()
                    .unwrap_or_else(|| "(auto)".to_string()),
            ),
            ("token_length".to_string(), self.token_length.to_string()),
            ("listen_port".to_string(), self.server.listen_port.to_string()),
            ("public_base_url".to_string(), self.server.public_base_url.clone()),
            (
                "cache_stale_secs".to_string(),
                format!("{}s", self.client.cache_stale_secs),
            ),
            (
                "request_timeout_secs".to_string(),
                format!("{}s", self.client.request_timeout_secs),
            ),
            ("ios_max_mb".to_string(), format!("{}MB", self.limits.ios_max_mb)),
            (
                "android_max_mb".to_string(),
                format!("{}MB", self.limits.android_max_mb),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_port, 8787);
        assert_eq!(config.token_length, 10);
        assert_eq!(config.size_limits(), SizeLimits::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api_base_url, Config::default().api_base_url);
    }

    #[test]
    fn test_set_save_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::load_from(&path).unwrap();
        config.set("listen_port", "9000").unwrap();
        config.set("public_base_url", "https://beta.example.com/").unwrap();
        config.set("ios_max_mb", "1024").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.get("listen_port").as_deref(), Some("9000"));
        assert_eq!(reloaded.server.public_base_url, "https://beta.example.com");
        assert_eq!(reloaded.size_limits().ios, 1024 * 1024 * 1024);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("listen_port", "not-a-port").is_err());
        assert!(config.set("token_length", "3").is_err());
        assert!(config.set("no_such_key", "1").is_err());
        assert!(config.get("no_such_key").is_none());
    }

    #[test]
    fn test_client_config_mapping() {
        let mut config = Config::default();
        config.set("cache_stale_secs", "5").unwrap();
        let client = config.client_config();
        assert_eq!(client.stale_time, Duration::from_secs(5));
        assert_eq!(client.base_url, config.api_base_url);
    }

    #[test]
    fn test_client_config_carries_size_limits() {
        let mut config = Config::default();
        config.set("ios_max_mb", "1024").unwrap();
        let client = config.client_config();
        assert_eq!(client.size_limits, SizeLimits::from_mb(1024, 512));
        assert_eq!(client.size_limits, config.size_limits());
    }
}
