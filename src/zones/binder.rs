//! Zone Binder
//!
//! Assigns each registered device to exactly one zone and keeps the
//! assignment stable until the device disappears. New devices fill zones
//! in round-robin order based on how many bindings have been made so far,
//! not on which zones are emptiest; this favors determinism over load
//! balancing.

use indexmap::IndexMap;
use tracing::debug;

use crate::registry::LogicalId;
use crate::zones::{Zone, ZoneId};

/// Device-to-zone binding table.
///
/// Exclusively owns the `logical id -> zone id` mapping. Multiple devices
/// may share a zone (the round-robin wraps) and a zone with zero devices
/// is valid.
#[derive(Debug, Default)]
pub struct ZoneBinder {
    bindings: IndexMap<LogicalId, ZoneId>,
    bound_total: usize,
}

impl ZoneBinder {
    /// Create an empty binder
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a device to a zone if it has no binding yet.
    ///
    /// Idempotent: an existing binding is returned unchanged regardless of
    /// any zone-list changes since it was made, even when the current list
    /// no longer contains that zone id. With no zones available this
    /// returns `None`; the dispatcher re-invokes it on every later sample,
    /// so assignment is eventually consistent once zones appear.
    ///
    /// The round-robin position is `bound_total mod zones.len()`, where
    /// `bound_total` counts every binding ever made and never decrements
    /// on unbind. Devices that churn can therefore skew load toward later
    /// zones; a least-loaded policy was deliberately not substituted.
    pub fn bind_if_unbound(&mut self, logical_id: &LogicalId, zones: &[Zone]) -> Option<ZoneId> {
        if let Some(zone_id) = self.bindings.get(logical_id) {
            return Some(*zone_id);
        }

        if zones.is_empty() {
            return None;
        }

        let zone = &zones[self.bound_total % zones.len()];
        self.bindings.insert(logical_id.clone(), zone.id);
        self.bound_total += 1;

        debug!("Bound device {} to zone {}", logical_id, zone.id);
        Some(zone.id)
    }

    /// The current binding for a device, if any
    pub fn binding(&self, logical_id: &LogicalId) -> Option<ZoneId> {
        self.bindings.get(logical_id).copied()
    }

    /// Remove the binding for a released device.
    ///
    /// The round-robin counter is not rewound.
    pub fn unbind_all(&mut self, logical_id: &LogicalId) -> Option<ZoneId> {
        let removed = self.bindings.shift_remove(logical_id);
        if let Some(zone_id) = removed {
            debug!("Unbound device {} from zone {}", logical_id, zone_id);
        }
        removed
    }

    /// Number of devices currently bound
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
