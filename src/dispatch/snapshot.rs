//! Published cursor snapshots
//!
//! The immutable view handed to the presentation layer after every
//! processed event and timer tick. A snapshot is a plain value: the
//! presentation layer can hold it across frames without observing later
//! mutations.

use serde::Serialize;

use crate::registry::{Color, LogicalId};
use crate::utils::Point;
use crate::zones::ZoneId;

/// One active cursor as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorView {
    /// Durable device id
    pub logical_id: LogicalId,
    /// Display color assigned to the device
    pub color: Color,
    /// Bound zone, absent while unbound or before zones exist
    pub zone_id: Option<ZoneId>,
    /// Badge number: the bound zone id, or the device's registration
    /// ordinal while unbound
    pub label: u32,
    /// Container-relative position, zone-clamped when bound
    pub position: Point,
    /// Whether the click pulse is showing
    pub pressed: bool,
}

/// The published state of the whole subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Active cursors in creation order
    pub cursors: Vec<CursorView>,
    /// Number of currently registered devices
    pub device_count: usize,
    /// Number of zones in the current directory
    pub zone_count: usize,
}

impl Snapshot {
    /// A snapshot with no cursors, devices or zones
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any cursor is active
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Find a cursor by logical id
    pub fn cursor(&self, logical_id: &LogicalId) -> Option<&CursorView> {
        self.cursors
            .iter()
            .find(|view| &view.logical_id == logical_id)
    }
}
