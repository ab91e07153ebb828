//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod types;

pub use types::{LoggingConfig, ServiceConfig, TrackerConfig, ZoneLayoutConfig, ZonesConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service loop configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Cursor tracking configuration
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Zone discovery configuration
    #[serde(default)]
    pub zones: ZonesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.event_queue_depth == 0 {
            anyhow::bail!("event_queue_depth must be at least 1");
        }

        if self.tracker.liveness_window_ms == 0 {
            anyhow::bail!("liveness_window_ms must be greater than 0");
        }
        if self.tracker.expiry_tick_ms == 0 {
            anyhow::bail!("expiry_tick_ms must be greater than 0");
        }
        if self.tracker.press_pulse_ms >= self.tracker.liveness_window_ms {
            anyhow::bail!(
                "press_pulse_ms ({}) must be shorter than liveness_window_ms ({})",
                self.tracker.press_pulse_ms,
                self.tracker.liveness_window_ms
            );
        }

        if self.zones.rescan_interval_ms == 0 {
            anyhow::bail!("rescan_interval_ms must be greater than 0");
        }
        if !self.zones.padding_px.is_finite() || self.zones.padding_px < 0.0 {
            anyhow::bail!("padding_px must be a non-negative number");
        }
        for (index, zone) in self.zones.layout.iter().enumerate() {
            if zone.width <= 0.0 || zone.height <= 0.0 {
                anyhow::bail!("zone layout entry {} has a degenerate rectangle", index);
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Invalid log level: {}", other),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.logging.level = level;
        }
        self
    }
}

impl TrackerConfig {
    /// Liveness window as a duration
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.liveness_window_ms)
    }

    /// Press pulse length as a duration
    pub fn press_pulse(&self) -> Duration {
        Duration::from_millis(self.press_pulse_ms)
    }

    /// Expiry sweep interval as a duration
    pub fn expiry_tick(&self) -> Duration {
        Duration::from_millis(self.expiry_tick_ms)
    }
}

impl ZonesConfig {
    /// Rescan polling interval as a duration
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms)
    }
}
