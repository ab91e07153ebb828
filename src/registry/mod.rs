//! Device identity registry
//!
//! Assigns a stable logical identity and a display color to each physical
//! pointing device for the lifetime of its connection. The input backend's
//! raw pointer ids are transient and may be reused across reconnects, so
//! the registry memoizes `raw id -> identity` and hands the durable
//! [`LogicalId`] to every downstream component.
//!
//! All operations are total: an unknown raw id always succeeds by
//! allocating a fresh identity, and releasing an unknown raw id is a
//! silent no-op.

use std::fmt;

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Transient pointer id assigned by the input backend.
///
/// Not guaranteed unique across reconnects; never use it as a durable key.
pub type RawPointerId = u32;

/// Fixed display color palette for device cursors.
///
/// Colors are drawn uniformly at random and may repeat across devices;
/// there is no uniqueness guarantee.
pub const PALETTE: [Color; 8] = [
    Color("#FF5252"),
    Color("#4CAF50"),
    Color("#2196F3"),
    Color("#FF9800"),
    Color("#9C27B0"),
    Color("#00BCD4"),
    Color("#FFC107"),
    Color("#795548"),
];

/// A cursor display color as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(&'static str);

impl Color {
    /// The color as a `#RRGGBB` hex string
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Pointer device class as reported by the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerClass {
    /// A physical mouse
    Mouse,
    /// A pen / stylus
    Pen,
    /// Ambient touch input; never tracked as a player device
    Touch,
}

impl PointerClass {
    /// Whether this class is multiplexed as a player device.
    ///
    /// Touch input is ambient on touchscreens and is discarded before any
    /// state is touched.
    pub fn is_tracked(&self) -> bool {
        matches!(self, PointerClass::Mouse | PointerClass::Pen)
    }
}

/// Durable logical device id, unique for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalId(String);

impl LogicalId {
    /// Allocate a fresh id.
    ///
    /// Uses a v4 UUID, so the collision probability over one process
    /// lifetime is negligible.
    fn generate() -> Self {
        Self(format!("device-{}", Uuid::new_v4().simple()))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The durable identity of one connected pointing device.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// Durable logical id
    pub logical_id: LogicalId,
    /// Display color for this device's cursor
    pub color: Color,
    /// Device class (mouse or pen; touch is never registered)
    pub class: PointerClass,
}

/// Registry of connected pointing devices.
///
/// Owns the `raw id -> identity` table exclusively; all access goes
/// through [`resolve`](DeviceRegistry::resolve),
/// [`release`](DeviceRegistry::release) and
/// [`lookup`](DeviceRegistry::lookup). Iteration order is registration
/// order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: IndexMap<RawPointerId, DeviceIdentity>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw pointer id to its device identity, allocating one on
    /// first sight.
    ///
    /// Memoized: subsequent calls with the same raw id return the same
    /// logical id and color. The class recorded at first sight sticks for
    /// the lifetime of the mapping.
    pub fn resolve(&mut self, raw_id: RawPointerId, class: PointerClass) -> &DeviceIdentity {
        self.devices.entry(raw_id).or_insert_with(|| {
            let identity = DeviceIdentity {
                logical_id: LogicalId::generate(),
                color: PALETTE[rand::thread_rng().gen_range(0..PALETTE.len())],
                class,
            };
            debug!(
                "Registered device: raw={} logical={} color={} class={:?}",
                raw_id, identity.logical_id, identity.color, identity.class
            );
            identity
        })
    }

    /// Look up a raw pointer id without allocating.
    ///
    /// Used by the cancel and leave paths, which must never register a
    /// device as a side effect.
    pub fn lookup(&self, raw_id: RawPointerId) -> Option<&DeviceIdentity> {
        self.devices.get(&raw_id)
    }

    /// Remove the mapping for a raw pointer id.
    ///
    /// Returns the released identity so the caller can tear down dependent
    /// state (binding, cursor). Cursor records keyed by the logical id are
    /// not touched here.
    pub fn release(&mut self, raw_id: RawPointerId) -> Option<DeviceIdentity> {
        let released = self.devices.shift_remove(&raw_id);
        if let Some(identity) = &released {
            debug!(
                "Released device: raw={} logical={}",
                raw_id, identity.logical_id
            );
        }
        released
    }

    /// Find a registered identity by logical id
    pub fn identity_of(&self, logical_id: &LogicalId) -> Option<&DeviceIdentity> {
        self.devices
            .values()
            .find(|identity| &identity.logical_id == logical_id)
    }

    /// 1-based registration ordinal of a device, used as the cursor badge
    /// when no zone is bound yet
    pub fn ordinal(&self, logical_id: &LogicalId) -> Option<usize> {
        self.devices
            .values()
            .position(|identity| &identity.logical_id == logical_id)
            .map(|index| index + 1)
    }

    /// Number of currently registered devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
