// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CarbION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use crate::series::parse_freq;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Forecast pipeline configuration
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// System configuration
    #[serde(default)]
    pub system: SystemConfig,

    /// Retrospective scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Forecast pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// HA entity whose history is forecast (e.g. the CO2 intensity sensor)
    #[serde(default = "default_input_entity")]
    pub input_entity: String,

    /// Number of future steps to forecast
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Step frequency code ("h", "30min", ...)
    #[serde(default = "default_freq")]
    pub freq: String,

    /// Trailing history window fed to the models (days)
    #[serde(default = "default_history_days")]
    pub history_days: i64,

    /// Reference timezone for forecast calendars (IANA name)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Recurring holiday dates ("MM-DD") for the seasonal-additive model
    #[serde(default = "default_holidays")]
    pub holidays: Vec<String>,

    /// Run the background forecast cycle inside the server binary
    #[serde(default)]
    pub enable_cycle: bool,
}

/// System configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Port for the prediction HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Forecast cycle interval (seconds)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Home Assistant base URL (optional, defaults to supervisor)
    pub ha_base_url: Option<String>,

    /// Home Assistant token (optional, uses SUPERVISOR_TOKEN if not set)
    pub ha_token: Option<String>,
}

/// Retrospective scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Directory holding per-model forecast log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Entity queried for realized values
    #[serde(default = "default_input_entity")]
    pub realized_entity: String,

    /// Nearest-neighbor match tolerance (minutes)
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: i64,

    /// Slack added past the last forecast timestamp when fetching realized
    /// values (minutes)
    #[serde(default = "default_window_slack_minutes")]
    pub window_slack_minutes: i64,
}

fn default_input_entity() -> String {
    "sensor.electricity_maps_co2_intensity".to_owned()
}

fn default_horizon() -> usize {
    24
}

fn default_freq() -> String {
    "h".to_owned()
}

fn default_history_days() -> i64 {
    7
}

fn default_timezone() -> String {
    "America/Santiago".to_owned()
}

fn default_holidays() -> Vec<String> {
    // Fixed-date Chilean national holidays; movable feasts are omitted
    ["01-01", "05-01", "05-21", "09-18", "09-19", "12-25"]
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}

fn default_port() -> u16 {
    5000
}

fn default_update_interval() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/config/forecasts")
}

fn default_tolerance_minutes() -> i64 {
    15
}

fn default_window_slack_minutes() -> i64 {
    30
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            input_entity: default_input_entity(),
            horizon: default_horizon(),
            freq: default_freq(),
            history_days: default_history_days(),
            timezone: default_timezone(),
            holidays: default_holidays(),
            enable_cycle: false,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            update_interval_secs: default_update_interval(),
            log_level: default_log_level(),
            ha_base_url: None,
            ha_token: None,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            realized_entity: default_input_entity(),
            tolerance_minutes: default_tolerance_minutes(),
            window_slack_minutes: default_window_slack_minutes(),
        }
    }
}

impl ForecastConfig {
    /// Parse the configured reference timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }

    /// Parse the recurring holiday list into (month, day) pairs.
    pub fn holiday_days(&self) -> Result<Vec<(u32, u32)>> {
        self.holidays
            .iter()
            .map(|raw| {
                // Validate month/day via a leap year so 02-29 is accepted
                let date = NaiveDate::parse_from_str(&format!("2024-{raw}"), "%Y-%m-%d")
                    .with_context(|| format!("Invalid holiday date '{raw}' (expected MM-DD)"))?;
                use chrono::Datelike;
                Ok((date.month(), date.day()))
            })
            .collect()
    }
}

impl AppConfig {
    /// Load configuration from HA addon options or a local config file.
    pub fn load() -> Result<Self> {
        // HA addon options first (/data/options.json)
        if let Ok(options_str) = std::fs::read_to_string("/data/options.json") {
            let config: AppConfig =
                serde_json::from_str(&options_str).context("Failed to parse HA addon options")?;
            info!("✅ Loaded configuration from HA addon options");
            config.validate()?;
            return Ok(config);
        }

        // config.toml for development
        if let Ok(config_str) = std::fs::read_to_string("config.toml") {
            let config: AppConfig =
                toml::from_str(&config_str).context("Failed to parse config.toml")?;
            info!("✅ Loaded configuration from config.toml");
            config.validate()?;
            return Ok(config);
        }

        warn!("No configuration file found, using defaults with environment overrides");
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment variable overrides (development/testing).
    fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(entity) = std::env::var("CARBION_INPUT_ENTITY") {
            config.forecast.input_entity = entity.clone();
            config.scoring.realized_entity = entity;
        }
        if let Ok(url) = std::env::var("HA_BASE_URL") {
            config.system.ha_base_url = Some(url);
        }
        if let Ok(token) = std::env::var("HA_TOKEN") {
            config.system.ha_token = Some(token);
        }
        if let Ok(port) = std::env::var("CARBION_PORT")
            && let Ok(port) = port.parse()
        {
            config.system.port = port;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.forecast.input_entity.is_empty() {
            anyhow::bail!("forecast.input_entity cannot be empty");
        }
        if self.forecast.horizon == 0 {
            anyhow::bail!("forecast.horizon must be positive");
        }
        if self.forecast.history_days < 1 {
            anyhow::bail!("forecast.history_days must be at least 1");
        }
        if parse_freq(&self.forecast.freq).is_none() {
            anyhow::bail!("forecast.freq '{}' is not a valid frequency code", self.forecast.freq);
        }
        self.forecast.tz()?;
        self.forecast.holiday_days()?;

        if self.system.port == 0 {
            anyhow::bail!("system.port must be nonzero");
        }
        if self.system.update_interval_secs < 60 {
            anyhow::bail!("system.update_interval_secs must be at least 60 seconds");
        }

        if self.scoring.tolerance_minutes <= 0 {
            anyhow::bail!("scoring.tolerance_minutes must be positive");
        }
        if self.scoring.window_slack_minutes < 0 {
            anyhow::bail!("scoring.window_slack_minutes must be non-negative");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast.horizon, 24);
        assert_eq!(config.forecast.freq, "h");
        assert_eq!(config.system.port, 5000);
    }

    #[test]
    fn test_validate_rejects_zero_horizon() {
        let mut config = AppConfig::default();
        config.forecast.horizon = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let mut config = AppConfig::default();
        config.forecast.timezone = "Mars/Olympus_Mons".to_owned();
        assert!(config.validate().unwrap_err().to_string().contains("Invalid timezone"));
    }

    #[test]
    fn test_validate_rejects_bad_holiday() {
        let mut config = AppConfig::default();
        config.forecast.holidays = vec!["13-01".to_owned()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_freq() {
        let mut config = AppConfig::default();
        config.forecast.freq = "eon".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_holiday_days_parse() {
        let config = ForecastConfig::default();
        let days = config.holiday_days().unwrap();
        assert!(days.contains(&(9, 18)));
        assert!(days.contains(&(12, 25)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let decoded: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(decoded.forecast.input_entity, config.forecast.input_entity);
        assert_eq!(decoded.scoring.tolerance_minutes, 15);
    }

    #[test]
    fn test_ha_addon_options_format() {
        let options = r#"{
            "forecast": {
                "input_entity": "sensor.co2_intensity",
                "horizon": 24,
                "freq": "h",
                "timezone": "America/Santiago"
            },
            "system": {
                "port": 5000,
                "update_interval_secs": 3600,
                "log_level": "info"
            },
            "scoring": {
                "log_dir": "/config/forecasts",
                "realized_entity": "sensor.co2_intensity"
            }
        }"#;
        let config: AppConfig = serde_json::from_str(options).unwrap();
        assert_eq!(config.forecast.input_entity, "sensor.co2_intensity");
        assert!(config.validate().is_ok());
    }
}
