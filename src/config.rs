//! Configuration for calorie-scale.

use crate::source::twitter::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default mean gap, in seconds, treated as zero intensity.
pub const DEFAULT_THRESHOLD_SECS: u32 = 6;

/// Default search keyword.
pub const DEFAULT_KEYWORD: &str = "#youtube";

/// Default OSC address path.
pub const DEFAULT_OSC_ADDRESS: &str = "/calorie";

/// How often the source is sampled.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(6);

/// How often the latest intensity is republished.
pub const PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

const REDACTED: &str = "<redacted>";

/// Main configuration. Built once at startup and never mutated afterwards.
///
/// The sample and publish cadences are not part of it; they are fixed at
/// [`SAMPLE_INTERVAL`] and [`PUBLISH_INTERVAL`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mean gap (seconds) at or beyond which intensity is zero
    pub threshold_secs: u32,

    /// Search query
    pub keyword: String,

    /// OSC receiver host
    pub osc_host: String,

    /// OSC receiver port
    pub osc_port: u16,

    /// OSC address path for published messages
    pub osc_address: String,

    /// Search API client id
    pub twitter_client_id: String,

    /// Search API client secret
    pub twitter_client_secret: String,

    /// Search API base URL
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_secs: DEFAULT_THRESHOLD_SECS,
            keyword: DEFAULT_KEYWORD.to_string(),
            osc_host: "localhost".to_string(),
            osc_port: 8765,
            osc_address: DEFAULT_OSC_ADDRESS.to_string(),
            twitter_client_id: "-".to_string(),
            twitter_client_secret: "-".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calorie-scale")
            .join("config.json")
    }

    /// Check that the configuration can drive the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold_secs == 0 {
            return Err(ConfigError::Invalid(
                "threshold must be a positive number of seconds".to_string(),
            ));
        }
        if self.keyword.trim().is_empty() {
            return Err(ConfigError::Invalid("keyword must not be empty".to_string()));
        }
        if self.osc_host.trim().is_empty() {
            return Err(ConfigError::Invalid("OSC host must not be empty".to_string()));
        }
        if !self.osc_address.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "OSC address '{}' must start with '/'",
                self.osc_address
            )));
        }
        Ok(())
    }

    /// Copy of this configuration with credentials hidden, for display.
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.twitter_client_id != "-" {
            shown.twitter_client_id = REDACTED.to_string();
        }
        if shown.twitter_client_secret != "-" {
            shown.twitter_client_secret = REDACTED.to_string();
        }
        shown
    }

    /// Pretty JSON with credentials hidden.
    pub fn to_display_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(&self.redacted())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// One-line summary suitable for a startup log.
    pub fn summary(&self) -> String {
        format!(
            "threshold={}s keyword={} osc={}:{}{}",
            self.threshold_secs, self.keyword, self.osc_host, self.osc_port, self.osc_address
        )
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.redacted();
        f.debug_struct("Config")
            .field("threshold_secs", &shown.threshold_secs)
            .field("keyword", &shown.keyword)
            .field("osc_host", &shown.osc_host)
            .field("osc_port", &shown.osc_port)
            .field("osc_address", &shown.osc_address)
            .field("twitter_client_id", &shown.twitter_client_id)
            .field("twitter_client_secret", &shown.twitter_client_secret)
            .field("api_base_url", &shown.api_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.threshold_secs, 6);
        assert_eq!(config.keyword, "#youtube");
        assert_eq!(config.osc_host, "localhost");
        assert_eq!(config.osc_port, 8765);
        assert_eq!(config.osc_address, "/calorie");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r##"{"keyword": "#rust", "osc_port": 9000}"##).unwrap();
        assert_eq!(config.keyword, "#rust");
        assert_eq!(config.osc_port, 9000);
        assert_eq!(config.threshold_secs, DEFAULT_THRESHOLD_SECS);
    }

    #[test]
    fn test_file_cannot_change_cadence() {
        let path = std::env::temp_dir().join("calorie-scale-cadence-config.json");
        std::fs::write(
            &path,
            r##"{"keyword": "#rust", "sample_interval": 60, "publish_interval": 120}"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.keyword, "#rust");
        assert!(config.validate().is_ok());
        assert_eq!(config, Config { keyword: "#rust".to_string(), ..Config::default() });
        assert_eq!(SAMPLE_INTERVAL, Duration::from_secs(6));
        assert_eq!(PUBLISH_INTERVAL, Duration::from_secs(1));
    }

    #[test]
    fn test_cadence_not_serialized() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json.get("sample_interval").is_none());
        assert!(json.get("publish_interval").is_none());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = Config {
            twitter_client_id: "abc-id".to_string(),
            twitter_client_secret: "xyz-secret".to_string(),
            ..Config::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("abc-id"));
        assert!(!shown.contains("xyz-secret"));
        assert!(shown.contains(REDACTED));
        assert!(shown.contains("#youtube"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            threshold_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            keyword: "   ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            osc_address: "calorie".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_hides_credentials() {
        let config = Config {
            twitter_client_id: "abc".to_string(),
            twitter_client_secret: "xyz".to_string(),
            ..Config::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.twitter_client_id, REDACTED);
        assert_eq!(shown.twitter_client_secret, REDACTED);
        assert_eq!(shown.keyword, config.keyword);

        // placeholders stay visible so a missing credential is obvious
        let shown = Config::default().redacted();
        assert_eq!(shown.twitter_client_id, "-");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("calorie-scale-missing-config.json");
        let _ = std::fs::remove_file(&path);
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_invalid_json() {
        let path = std::env::temp_dir().join("calorie-scale-invalid-config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
