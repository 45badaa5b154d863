//! Configuration management for Hestia
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{HestiaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vendor panel access configuration
    pub panel: PanelConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Poll schedule configuration
    pub schedule: ScheduleConfig,

    /// Wait timeouts used by the panel state machine
    pub timeouts: TimeoutsConfig,

    /// Home Assistant endpoint configuration
    pub hass: HassConfig,
}

/// Vendor panel access parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Login page URL of the vendor panel
    pub url: String,

    /// Panel account username
    pub username: String,

    /// Panel account password
    pub password: String,

    /// Path to the browser executable used for scraping
    pub exec_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file or log directory
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    #[serde(default)]
    pub json_format: bool,
}

/// Poll schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Second within each minute at which a poll cycle starts
    pub offset_second: u8,
}

/// Wait timeouts for the panel state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Presence wait for navigation anchors, in seconds
    pub element_secs: u64,

    /// Visibility wait for the asynchronously populated parameters page,
    /// in seconds
    pub params_secs: u64,

    /// Driver-side polling interval while waiting, in milliseconds
    pub poll_millis: u64,
}

/// Home Assistant endpoint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HassConfig {
    /// Base URL of the Home Assistant instance
    pub base_url: String,

    /// Long-lived access token
    pub token: String,

    /// Prefix for published entity ids (sensor.<prefix>_<key>)
    pub entity_prefix: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            exec_path: "/usr/bin/chromium".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/hestia.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { offset_second: 31 }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            element_secs: 5,
            params_secs: 10,
            poll_millis: 500,
        }
    }
}

impl Default for HassConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8123".to_string(),
            token: String::new(),
            entity_prefix: "kospel".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            logging: LoggingConfig::default(),
            schedule: ScheduleConfig::default(),
            timeouts: TimeoutsConfig::default(),
            hass: HassConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "hestia_config.yaml",
            "/data/hestia_config.yaml",
            "/etc/hestia/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Panel inputs are checked for presence only, not format.
    pub fn validate(&self) -> Result<()> {
        if self.panel.url.is_empty() {
            return Err(HestiaError::validation("panel.url", "URL cannot be empty"));
        }

        if self.panel.username.is_empty() {
            return Err(HestiaError::validation(
                "panel.username",
                "Username cannot be empty",
            ));
        }

        if self.panel.password.is_empty() {
            return Err(HestiaError::validation(
                "panel.password",
                "Password cannot be empty",
            ));
        }

        if self.panel.exec_path.is_empty() {
            return Err(HestiaError::validation(
                "panel.exec_path",
                "Browser executable path cannot be empty",
            ));
        }

        if self.hass.base_url.is_empty() {
            return Err(HestiaError::validation(
                "hass.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.schedule.offset_second > 59 {
            return Err(HestiaError::validation(
                "schedule.offset_second",
                "Must be within 0..=59",
            ));
        }

        if self.timeouts.element_secs == 0 || self.timeouts.params_secs == 0 {
            return Err(HestiaError::validation(
                "timeouts",
                "Wait timeouts must be greater than 0",
            ));
        }

        Ok(())
    }
}
