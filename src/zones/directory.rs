//! Zone Directory
//!
//! Maintains the current zone list by scanning the presentation layer's
//! tagged surfaces. Surfaces can move, resize, appear and disappear
//! without notice, so every rescan replaces the previous result wholesale;
//! the directory never merges.

use tracing::debug;

use crate::utils::Point;
use crate::zones::{SurfaceProvider, Zone, ZoneId};

/// Directory of the currently discovered interaction zones.
///
/// Exclusively owns the zone list. [`rescan`](ZoneDirectory::rescan) is
/// driven at startup, on viewport resize and on a fixed polling interval;
/// [`current_zones`](ZoneDirectory::current_zones) returns the last scan
/// result and never blocks.
#[derive(Debug, Default)]
pub struct ZoneDirectory {
    zones: Vec<Zone>,
    origin: Point,
    rescans: u64,
}

impl ZoneDirectory {
    /// Create an empty directory.
    ///
    /// The zone list stays empty until the first
    /// [`rescan`](ZoneDirectory::rescan).
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the provider and replace the zone list wholesale.
    ///
    /// Zone ids come from each surface's declared attribute, falling back
    /// to the 1-based positional index. The returned order is the tagging
    /// order; it only determines the round-robin sequence within this
    /// scan. A scan that finds nothing yields an empty list, which
    /// degrades all clamping to pass-through until surfaces reappear.
    pub fn rescan(&mut self, provider: &dyn SurfaceProvider) -> &[Zone] {
        self.origin = provider.origin();
        self.zones = provider
            .surfaces()
            .into_iter()
            .enumerate()
            .map(|(index, surface)| Zone {
                id: ZoneId(surface.zone_attr.unwrap_or(index as u32 + 1)),
                bounds: surface.bounds,
            })
            .collect();
        self.rescans += 1;

        debug!("Zone rescan #{}: {} zones", self.rescans, self.zones.len());
        &self.zones
    }

    /// The zone list from the last rescan, in tagging order
    pub fn current_zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Resolve a zone id against the current list.
    ///
    /// Returns `None` for ids that the latest scan no longer reports;
    /// callers holding such a stale id fall back to unclamped coordinates.
    pub fn zone_by_id(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    /// Top-left corner of the tracking surface from the last rescan
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Number of zones in the current list
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
