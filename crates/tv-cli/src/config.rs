//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tv_calendar::google::DEFAULT_MAX_RESULTS;
use tv_core::{ValidationError, parse_utc_offset};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Offset every timestamp is normalized to before comparison.
    pub utc_offset: String,

    /// Google Calendar to read events from.
    pub calendar_id: String,

    /// Google OAuth access token. Takes precedence over `token_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Google "authorized user" credentials file (`token.json`).
    pub token_path: PathBuf,

    /// Page size for calendar requests.
    pub max_results: u32,

    /// Where `validate` writes the spreadsheet report.
    pub report_path: PathBuf,

    /// Offline calendar export to read instead of the Google API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_file: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("utc_offset", &self.utc_offset)
            .field("calendar_id", &self.calendar_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_path", &self.token_path)
            .field("max_results", &self.max_results)
            .field("report_path", &self.report_path)
            .field("calendar_file", &self.calendar_file)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            utc_offset: "+05:30".to_string(),
            calendar_id: "primary".to_string(),
            access_token: None,
            token_path: config_dir.join("token.json"),
            max_results: DEFAULT_MAX_RESULTS,
            report_path: PathBuf::from("validation_report.xlsx"),
            calendar_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TV_*)
        figment = figment.merge(Env::prefixed("TV_"));

        figment.extract()
    }

    /// Parses the configured reference offset.
    pub fn offset(&self) -> Result<FixedOffset, ValidationError> {
        parse_utc_offset(&self.utc_offset)
    }
}

/// Returns the platform-specific config directory for tv.
///
/// On Linux: `~/.config/tv`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_tv() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tv");
    }

    #[test]
    fn test_default_config_uses_ist_and_primary_calendar() {
        let config = Config::default();
        assert_eq!(config.offset().unwrap().local_minus_utc(), 19_800);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_default_token_path_in_config_dir() {
        let config = Config::default();
        assert_eq!(
            config.token_path,
            dirs_config_path().unwrap().join("token.json")
        );
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tv.toml");
        std::fs::write(
            &path,
            "utc_offset = \"-08:00\"\ncalendar_id = \"team@example.com\"\nmax_results = 50\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.offset().unwrap().local_minus_utc(), -28_800);
        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(config.max_results, 50);
    }

    #[test]
    fn test_invalid_offset_is_reported() {
        let config = Config {
            utc_offset: "IST".to_string(),
            ..Config::default()
        };
        assert!(config.offset().is_err());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = Config {
            access_token: Some("ya29.secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
