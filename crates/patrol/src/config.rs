//! Configuration management for the patrol console.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{builtin_points, PatrolPoint};
use crate::error::{Error, Result};
use crate::scanner::{Facing, ScannerOptions};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "patrol";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "patrol.db";

/// Checkpoint codes are uppercase letters, digits, `-` and `_`.
const CODE_PATTERN: &str = r"^[A-Z0-9][A-Z0-9_-]*$";

/// The compiled checkpoint code pattern, built on first use.
fn code_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(CODE_PATTERN))
        .as_ref()
        .map_err(|e| Error::internal(e.to_string()))
}

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PATROL_`)
/// 2. TOML config file at `~/.config/patrol/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Scanner configuration.
    pub scanner: ScannerConfig,
    /// Checkpoint directory override. Empty means the built-in directory.
    pub checkpoints: Vec<PatrolPoint>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/patrol/patrol.db`
    pub database_path: Option<PathBuf>,
}

/// Scanner-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Decode attempts per second.
    pub fps: u32,
    /// Camera to request.
    pub facing: Facing,
    /// Show a message for every frame with no code in view.
    pub report_frame_errors: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let options = ScannerOptions::default();
        Self {
            fps: options.fps,
            facing: options.facing,
            report_frame_errors: options.report_frame_errors,
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
            .merge(Env::prefixed("PATROL_").split("__"));

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
        if self.scanner.fps == 0 {
            return Err(Error::config_validation("scanner.fps must be greater than 0"));
        }

        let pattern = code_pattern()?;
        let mut seen = HashSet::new();
        for point in &self.checkpoints {
            if !pattern.is_match(&point.code) {
                return Err(Error::config_validation(format!(
                    "invalid checkpoint code '{}': use uppercase letters, digits, '-' or '_'",
                    point.code
                )));
            }
            if point.name.trim().is_empty() {
                return Err(Error::config_validation(format!(
                    "checkpoint '{}' has an empty name",
                    point.code
                )));
            }
            if !seen.insert(point.code.as_str()) {
                return Err(Error::config_validation(format!(
                    "duplicate checkpoint code '{}'",
                    point.code
                )));
            }
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

    /// The checkpoint directory in effect.
    #[must_use]
    pub fn patrol_points(&self) -> Vec<PatrolPoint> {
        if self.checkpoints.is_empty() {
            builtin_points()
        } else {
            self.checkpoints.clone()
        }
    }

    /// Scanner session options.
    #[must_use]
    pub fn scanner_options(&self) -> ScannerOptions {
        ScannerOptions {
            fps: self.scanner.fps,
            facing: self.scanner.facing,
            report_frame_errors: self.scanner.report_frame_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.scanner.fps, 10);
        assert_eq!(config.scanner.facing, Facing::Environment);
        assert!(config.scanner.report_frame_errors);
        assert!(config.checkpoints.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_fps() {
        let mut config = Config::default();
        config.scanner.fps = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("scanner.fps"));
    }

    #[test]
    fn test_validate_lowercase_code() {
        let mut config = Config::default();
        config.checkpoints = vec![PatrolPoint::new("gate-1", "Gate 1", "Perimeter", &[])];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid checkpoint code"));
    }

    #[test]
    fn test_code_pattern_is_compiled_once() {
        let first = code_pattern().unwrap();
        let second = code_pattern().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(first.is_match("BLDG-A-LOBBY"));
        assert!(first.is_match("GATE_1"));
        assert!(!first.is_match("-GATE"));
        assert!(!first.is_match("gate-1"));
    }

    #[test]
    fn test_validate_duplicate_code() {
        let mut config = Config::default();
        config.checkpoints = vec![
            PatrolPoint::new("GATE-1", "Gate 1", "Perimeter", &[]),
            PatrolPoint::new("GATE-1", "Gate 1 again", "Perimeter", &[]),
        ];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate checkpoint code"));
    }

    #[test]
    fn test_validate_empty_name() {
        let mut config = Config::default();
        config.checkpoints = vec![PatrolPoint::new("GATE-1", "  ", "Perimeter", &[])];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("empty name"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("patrol.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/patrol.db"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/patrol.db")
        );
    }

    #[test]
    fn test_patrol_points_default_to_builtin() {
        assert_eq!(Config::default().patrol_points(), builtin_points());
    }

    #[test]
    fn test_scanner_options_follow_config() {
        let mut config = Config::default();
        config.scanner.fps = 25;
        config.scanner.report_frame_errors = false;

        let options = config.scanner_options();
        assert_eq!(options.fps, 25);
        assert!(!options.report_frame_errors);
        assert_eq!(options.facing, Facing::Environment);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("patrol"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[storage]
database_path = "/tmp/patrol-test.db"

[scanner]
fps = 5
report_frame_errors = false

[[checkpoints]]
code = "GATE-1"
name = "Main Gate"
area = "Perimeter"
checklist = ["Check barrier arm", "Check guard booth"]
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/patrol-test.db")
        );
        assert_eq!(config.scanner.fps, 5);
        assert!(!config.scanner.report_frame_errors);

        let points = config.patrol_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].code, "GATE-1");
        assert_eq!(points[0].checklist.len(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[scanner]\nfps = 0\n").unwrap();

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_serializes_to_json() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("report_frame_errors"));
        assert!(json.contains("environment"));
    }
}
