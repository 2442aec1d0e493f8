//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use airguide_api::xmltv::{DEFAULT_GUIDE_URL, DEFAULT_TIMEOUT};
use airguide_engine::{
    DEFAULT_CHANNEL_ID, DEFAULT_LOW_WATER_MARK, DEFAULT_POLL_INTERVAL, EngineSettings,
};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Guide source and refresh policy.
    #[serde(default)]
    pub guide: GuideConfig,
}

/// `[guide]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuideConfig {
    /// XMLTV document URL.
    pub url: String,
    /// XMLTV channel identifier.
    pub channel_id: String,
    /// Seconds between reconciliation ticks.
    pub poll_interval_secs: u64,
    /// Refill when fewer programmes than this remain.
    pub low_water_mark: usize,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_GUIDE_URL),
            channel_id: String::from(DEFAULT_CHANNEL_ID),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            low_water_mark: DEFAULT_LOW_WATER_MARK,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl GuideConfig {
    /// Builds engine settings from this section.
    ///
    /// # Errors
    ///
    /// Returns an error if `poll_interval_secs` is zero or `channel_id` is empty.
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        ensure!(
            self.poll_interval_secs > 0,
            "guide.poll_interval_secs must be greater than zero"
        );
        ensure!(
            !self.channel_id.trim().is_empty(),
            "guide.channel_id must not be empty"
        );
        Ok(EngineSettings {
            channel_id: self.channel_id.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            low_water_mark: self.low_water_mark,
        })
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Serializes to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }
}
