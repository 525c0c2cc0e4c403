//! User settings for Spendwise
//!
//! Display preferences, calendar layout, startup behavior and the default
//! log filter.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::paths::SpendPaths;
use crate::error::SpendError;

/// User settings for Spendwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// First day of week (0 = Sunday, 1 = Monday)
    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: u8,

    /// Generate due recurring expenses every time the CLI starts
    #[serde(default = "default_auto_materialize")]
    pub auto_materialize: bool,

    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_first_day_of_week() -> u8 {
    0 // Sunday
}

fn default_auto_materialize() -> bool {
    true
}

fn default_log_filter() -> String {
    "spendwise=warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            first_day_of_week: default_first_day_of_week(),
            auto_materialize: default_auto_materialize(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Weekday shown in the first calendar column
    ///
    /// Anything other than 1 (Monday) falls back to Sunday.
    pub fn week_start(&self) -> Weekday {
        match self.first_day_of_week {
            1 => Weekday::Mon,
            _ => Weekday::Sun,
        }
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &SpendPaths) -> Result<Self, SpendError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SpendError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| SpendError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Not persisted until the caller decides to
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendPaths) -> Result<(), SpendError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SpendError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Set a single setting by key, as used by `spendwise config <key> <value>`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpendError> {
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(SpendError::Config("date_format cannot be empty".into()));
                }
                self.date_format = value.to_string();
            }
            "first_day_of_week" => {
                self.first_day_of_week = match value.to_ascii_lowercase().as_str() {
                    "0" | "sun" | "sunday" => 0,
                    "1" | "mon" | "monday" => 1,
                    other => {
                        return Err(SpendError::Config(format!(
                            "first_day_of_week must be sunday or monday, got '{}'",
                            other
                        )))
                    }
                };
            }
            "auto_materialize" => {
                self.auto_materialize = value.parse().map_err(|_| {
                    SpendError::Config(format!("auto_materialize must be true or false, got '{}'", value))
                })?;
            }
            "log_filter" => self.log_filter = value.to_string(),
            other => return Err(SpendError::Config(format!("Unknown setting: {}", other))),
        }
        Ok(())
    }
}
