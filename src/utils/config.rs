//! Configuration management for showreel
//!
//! This module handles loading and managing application configuration
//! from config files and environment variables.

use crate::player::PlayerConfig;
use crate::utils::error::{Result, ShowreelError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Headless CMS configuration
    pub notion: NotionConfig,

    /// CDN configuration
    pub cdn: CdnConfig,

    /// Player behaviour
    pub player: PlayerConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_addr: String,

    /// Allow cross-origin requests from any origin
    pub cors_allow_any: bool,
}

/// Notion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token. Usually supplied through `NOTION_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Blog database id
    pub blog_database_id: Option<String>,

    /// Portfolio projects database id
    pub projects_database_id: Option<String>,

    /// API root, overridable for tests
    pub api_base: String,

    /// Value of the `Notion-Version` header
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// CDN configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Public bucket URL. Required at first use, not at startup.
    pub public_url: Option<String>,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            cors_allow_any: true,
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            blog_database_id: None,
            projects_database_id: None,
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/showreel/config.toml on Linux)
    /// 3. User config file (~/.config/showreel/config.toml on Linux)
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        let files: Vec<PathBuf> = [Self::system_config_path(), Self::user_config_path()]
            .into_iter()
            .flatten()
            .filter(|path| path.exists())
            .collect();

        let mut config = Self::from_files(&files)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a single TOML file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_files(&[path.to_path_buf()])
    }

    /// Layer TOML files in order, later keys overriding earlier ones
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        for path in paths {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ShowreelError::Configuration(format!("Failed to read config file: {}", e)))?;
            let layer: toml::Value = toml::from_str(&contents).map_err(|e| {
                ShowreelError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            merge_toml(&mut merged, layer);
        }

        merged
            .try_into()
            .map_err(|e| ShowreelError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    ///
    /// The lookup is injected so tests don't have to touch the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("NOTION_API_KEY") {
            self.notion.api_key = Some(key);
        }

        if let Some(id) = lookup("NOTION_DATABASE_ID") {
            self.notion.blog_database_id = Some(id);
        }

        if let Some(id) = lookup("NOTION_PROJECTS_DATABASE_ID") {
            self.notion.projects_database_id = Some(id);
        }

        // The site's build pipeline exposes the bucket under the public prefix
        if let Some(url) = lookup("SHOWREEL_R2_PUBLIC_URL").or_else(|| lookup("NEXT_PUBLIC_R2_PUBLIC_URL")) {
            self.cdn.public_url = Some(url);
        }

        if let Some(addr) = lookup("SHOWREEL_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(delay) = lookup("SHOWREEL_CONTROLS_HIDE_MS") {
            self.player.controls_hide_delay_ms = delay
                .parse()
                .map_err(|_| ShowreelError::Configuration("Invalid SHOWREEL_CONTROLS_HIDE_MS".to_string()))?;
        }

        if let Some(log_level) = lookup("SHOWREEL_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ShowreelError::Configuration(format!(
                "Invalid bind address '{}'",
                self.server.bind_addr
            )));
        }

        if self.player.controls_hide_delay_ms == 0 {
            return Err(ShowreelError::Configuration(
                "Controls hide delay must be non-zero".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(ShowreelError::Configuration(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/showreel/config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/showreel/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("showreel").join("config.toml"))
    }
}

/// Merge `overlay` into `base`. Tables merge key by key, anything else is replaced.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
