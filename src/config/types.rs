//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::utils::Rect;
use crate::zones::SurfaceInfo;

/// Service loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Capacity of the host event queue
    #[serde(default = "default_event_queue_depth")]
    pub event_queue_depth: usize,
}

fn default_event_queue_depth() -> usize {
    64
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_queue_depth: default_event_queue_depth(),
        }
    }
}

/// Cursor tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Milliseconds without a sample after which a cursor is considered
    /// gone
    #[serde(default = "default_liveness_window_ms")]
    pub liveness_window_ms: u64,

    /// Milliseconds the click pulse stays visible after a press
    #[serde(default = "default_press_pulse_ms")]
    pub press_pulse_ms: u64,

    /// Milliseconds between expiry sweeps when no input arrives
    #[serde(default = "default_expiry_tick_ms")]
    pub expiry_tick_ms: u64,
}

fn default_liveness_window_ms() -> u64 {
    2000
}

fn default_press_pulse_ms() -> u64 {
    200
}

fn default_expiry_tick_ms() -> u64 {
    1000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            liveness_window_ms: default_liveness_window_ms(),
            press_pulse_ms: default_press_pulse_ms(),
            expiry_tick_ms: default_expiry_tick_ms(),
        }
    }
}

/// Zone discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesConfig {
    /// Milliseconds between zone rescans, to tolerate surfaces that
    /// mutate without a resize signal
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,

    /// Pixels of inset applied when clamping a cursor into its zone
    #[serde(default = "default_padding_px")]
    pub padding_px: f64,

    /// Static zone layout for the headless driver; rendered hosts
    /// discover zones live and leave this empty
    #[serde(default)]
    pub layout: Vec<ZoneLayoutConfig>,
}

fn default_rescan_interval_ms() -> u64 {
    2000
}

fn default_padding_px() -> f64 {
    10.0
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            rescan_interval_ms: default_rescan_interval_ms(),
            padding_px: default_padding_px(),
            layout: Vec::new(),
        }
    }
}

/// One statically configured zone rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneLayoutConfig {
    /// Declared zone id; positional index is used when absent
    #[serde(default)]
    pub id: Option<u32>,

    /// Left edge in viewport pixels
    pub x: f64,

    /// Top edge in viewport pixels
    pub y: f64,

    /// Width in pixels
    pub width: f64,

    /// Height in pixels
    pub height: f64,
}

impl ZoneLayoutConfig {
    /// Convert to the surface shape consumed by the zone directory
    pub fn to_surface(&self) -> SurfaceInfo {
        SurfaceInfo {
            zone_attr: self.id,
            bounds: Rect::new(self.x, self.y, self.width, self.height),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level when not overridden on the command line
    /// ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
