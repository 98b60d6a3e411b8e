//! Configuration management for bowling-companion.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bowling-companion";

/// Default database file name.
pub const DATABASE_FILE_NAME: &str = "bowling_companion.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "BOWLING_COMPANION_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BOWLING_COMPANION_`, sections
///    separated by `__`, e.g. `BOWLING_COMPANION_TRANSFER__SERVER_URL`)
/// 2. TOML config file at `~/.config/bowling-companion/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Transfer server configuration.
    pub transfer: TransferConfig,
    /// Statistics configuration.
    pub statistics: StatisticsConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/bowling-companion/bowling_companion.db`
    pub database_path: Option<PathBuf>,
}

/// Transfer server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Base URL of the transfer server. Transfers are disabled when unset.
    pub server_url: Option<String>,
    /// Value sent in the `Authorization` header on upload.
    pub api_key: Option<String>,
    /// Connect and read timeout in seconds.
    pub timeout_secs: u64,
    /// Chunk size used while streaming the database file.
    pub buffer_size: usize,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_field_names)]
pub struct StatisticsConfig {
    /// Count event leagues in bowler and team statistics.
    pub include_events: bool,
    /// Count the open league in bowler and team statistics.
    pub include_open_games: bool,
}

/// How series lists are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesView {
    /// One line per game.
    #[default]
    Expanded,
    /// One line per series.
    Condensed,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How series lists are rendered.
    pub series_view: SeriesView,
    /// Mark series over the league's series highlight.
    pub highlight_series: bool,
    /// Mark games over the league's game highlight.
    pub highlight_scores: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            timeout_secs: 10,
            buffer_size: 32 * 1024,
        }
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            include_events: true,
            include_open_games: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            series_view: SeriesView::Expanded,
            highlight_series: true,
            highlight_scores: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.transfer.server_url {
            let parsed = reqwest::Url::parse(url).map_err(|e| {
                Error::config_validation(format!("invalid transfer.server_url '{url}': {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config_validation(format!(
                    "transfer.server_url must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        if self.transfer.timeout_secs == 0 {
            return Err(Error::config_validation(
                "transfer.timeout_secs must be greater than 0",
            ));
        }

        if self.transfer.buffer_size == 0 {
            return Err(Error::config_validation(
                "transfer.buffer_size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the transfer timeout as a Duration.
    #[must_use]
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.transfer.server_url.is_none());
        assert_eq!(config.transfer.timeout_secs, 10);
        assert_eq!(config.transfer.buffer_size, 32 * 1024);
        assert!(config.statistics.include_events);
        assert!(config.statistics.include_open_games);
        assert_eq!(config.display.series_view, SeriesView::Expanded);
        assert!(config.display.highlight_series);
        assert!(config.display.highlight_scores);
    }

    #[test]
    fn test_validate_valid_config() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.transfer.server_url = Some("https://transfer.example.com/api".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_url() {
        let mut config = Config::default();
        config.transfer.server_url = Some("not a url".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server_url"));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.transfer.server_url = Some("ftp://example.com".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("http or https"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.transfer.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_zero_buffer() {
        let mut config = Config::default();
        config.transfer.buffer_size = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("buffer_size"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains(DATABASE_FILE_NAME));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/bowling.db"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/bowling.db")
        );
    }

    #[test]
    fn test_transfer_timeout() {
        let config = Config::default();
        assert_eq!(config.transfer_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("bowling-companion"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "bowling_companion_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
[transfer]
server_url = "http://localhost:8080"
timeout_secs = 30

[display]
series_view = "condensed"
highlight_scores = false
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(
            config.transfer.server_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.transfer.timeout_secs, 30);
        assert_eq!(config.transfer.buffer_size, 32 * 1024);
        assert_eq!(config.display.series_view, SeriesView::Condensed);
        assert!(!config.display.highlight_scores);
        assert!(config.display.highlight_series);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_series_view_deserialize() {
        let view: SeriesView = serde_json::from_str("\"condensed\"").unwrap();
        assert_eq!(view, SeriesView::Condensed);
    }
}
