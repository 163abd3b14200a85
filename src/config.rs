//! User settings.
//!
//! Settings live in an optional TOML file; a missing file means defaults.
//!
//! ```toml
//! elevate = false
//! elevation_command = ["sudo"]
//! json = false
//!
//! [tail]
//! interval = 0.25
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variable that overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "PORTGRAB_CONFIG_PATH";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Always run native tools through `elevation_command`.
    pub elevate: bool,

    /// Helper command and its arguments, e.g. `["sudo", "-n"]`.
    pub elevation_command: Vec<String>,

    /// Print JSON instead of a table by default.
    pub json: bool,

    pub tail: TailSettings,
}

/// Settings for the `tail` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TailSettings {
    /// Poll interval in seconds.
    pub interval: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            elevate: false,
            elevation_command: vec!["sudo".to_string()],
            json: false,
            tail: TailSettings::default(),
        }
    }
}

impl Default for TailSettings {
    fn default() -> Self {
        Self { interval: 0.25 }
    }
}

impl Settings {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.elevation_command.first().map_or(true, |c| c.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "elevation_command",
                reason: "must name a program".to_string(),
            });
        }
        interval_from_secs(self.tail.interval)?;
        Ok(())
    }
}

/// Converts a poll interval in seconds, rejecting zero, negative and
/// non-finite values.
pub fn interval_from_secs(secs: f64) -> std::result::Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidValue {
            key: "tail.interval",
            reason: format!("{secs} is not a positive number of seconds"),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Returns the path to the settings file.
///
/// Respects the `PORTGRAB_CONFIG_PATH` environment variable if set,
/// otherwise uses the system config directory.
pub fn settings_path() -> std::result::Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("portgrab").join("config.toml"))
}

/// Loads settings from the default location.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path()?)
}

/// Loads settings from `path`, falling back to defaults if it does not exist.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::debug!("no settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })?;

    settings.validate()?;
    Ok(settings)
}
