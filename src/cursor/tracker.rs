//! Cursor Tracker
//!
//! Converts raw viewport coordinates into container-relative, zone-clamped
//! coordinates and maintains a time-stamped position record per device.
//! Records that stop being refreshed expire after the liveness window, so
//! a device that is unplugged without a cancel signal still disappears
//! from the snapshot.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::debug;

use crate::registry::LogicalId;
use crate::utils::{clamp_into_rect, Point, Rect};

/// The kind of one pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Position update
    Move,
    /// Button press; starts the click pulse
    Down,
    /// Button release
    Up,
}

/// Coordinate context for one sample, supplied by the dispatcher.
///
/// `origin` anchors the container-relative frame; `zone_bounds` is the
/// bound zone's rectangle in viewport coordinates, absent when the device
/// is unbound or its binding has gone stale. Without it the sample passes
/// through unclamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClampFrame {
    /// Top-left corner of the tracking surface in viewport coordinates
    pub origin: Point,
    /// Bound zone rectangle in viewport coordinates, if resolvable
    pub zone_bounds: Option<Rect>,
}

/// Live position/state record for one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Container-relative position, clamped into the bound zone when one
    /// is resolvable
    pub position: Point,
    /// Whether the click pulse is currently showing
    pub pressed: bool,
    /// When this record was last refreshed
    pub updated_at: Instant,
}

/// Tracks one [`Cursor`] per active device.
///
/// Iteration order is creation order, which is also the snapshot order.
#[derive(Debug)]
pub struct CursorTracker {
    cursors: IndexMap<LogicalId, Cursor>,
    liveness_window: Duration,
    padding: f64,
}

impl CursorTracker {
    /// Create a tracker with the given liveness window and zone-clamp
    /// padding
    pub fn new(liveness_window: Duration, padding: f64) -> Self {
        Self {
            cursors: IndexMap::new(),
            liveness_window,
            padding,
        }
    }

    /// Record one pointer sample.
    ///
    /// Move and Down samples convert the viewport-absolute point into the
    /// container-relative frame and clamp it into the zone rectangle
    /// (inset by the padding) when the frame carries one; Down also raises
    /// the pressed flag. Up refreshes the timestamp and lowers the flag
    /// without moving the cursor, and never creates a record; cursors
    /// come into existence on movement and press samples only.
    pub fn observe(
        &mut self,
        logical_id: &LogicalId,
        raw_point: Point,
        kind: SampleKind,
        frame: &ClampFrame,
        now: Instant,
    ) -> Option<&Cursor> {
        match kind {
            SampleKind::Move | SampleKind::Down => {
                let mut position = raw_point.relative_to(frame.origin);
                if let Some(zone_bounds) = frame.zone_bounds {
                    let zone_relative = zone_bounds.relative_to(frame.origin);
                    position = clamp_into_rect(position, zone_relative, self.padding);
                }

                let pressed_now = kind == SampleKind::Down;
                let cursor = self
                    .cursors
                    .entry(logical_id.clone())
                    .and_modify(|cursor| {
                        cursor.position = position;
                        cursor.pressed = cursor.pressed || pressed_now;
                        cursor.updated_at = now;
                    })
                    .or_insert(Cursor {
                        position,
                        pressed: pressed_now,
                        updated_at: now,
                    });
                Some(&*cursor)
            }
            SampleKind::Up => {
                let cursor = self.cursors.get_mut(logical_id)?;
                cursor.pressed = false;
                cursor.updated_at = now;
                Some(&*cursor)
            }
        }
    }

    /// End the click pulse for one cursor.
    ///
    /// Driven by the delayed pulse task. A pulse arriving after its cursor
    /// expired or was removed is silently discarded; it must never
    /// resurrect state. The liveness timestamp is not refreshed: the
    /// pulse is a presentation affordance, not activity.
    pub fn end_press_pulse(&mut self, logical_id: &LogicalId) -> bool {
        match self.cursors.get_mut(logical_id) {
            Some(cursor) => {
                cursor.pressed = false;
                true
            }
            None => false,
        }
    }

    /// Remove every cursor not refreshed within the liveness window.
    ///
    /// Returns the removed ids so dependent state can react. Invoked on
    /// every Move pass and on the expiry interval, so records disappear
    /// even when no new input arrives.
    pub fn expire_stale(&mut self, now: Instant) -> Vec<LogicalId> {
        let expired: Vec<LogicalId> = self
            .cursors
            .iter()
            .filter(|(_, cursor)| now.duration_since(cursor.updated_at) > self.liveness_window)
            .map(|(logical_id, _)| logical_id.clone())
            .collect();

        for logical_id in &expired {
            self.cursors.shift_remove(logical_id);
            debug!("Cursor expired: {}", logical_id);
        }

        expired
    }

    /// Remove one cursor (device cancel or pointer leave)
    pub fn remove(&mut self, logical_id: &LogicalId) -> bool {
        self.cursors.shift_remove(logical_id).is_some()
    }

    /// Remove every cursor at once (window blur: the user left the
    /// application and all devices are considered released)
    pub fn clear(&mut self) {
        if !self.cursors.is_empty() {
            debug!("Clearing {} cursors", self.cursors.len());
        }
        self.cursors.clear();
    }

    /// The cursor for one device, if active
    pub fn get(&self, logical_id: &LogicalId) -> Option<&Cursor> {
        self.cursors.get(logical_id)
    }

    /// Active cursors in creation order
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalId, &Cursor)> {
        self.cursors.iter()
    }

    /// Number of active cursors
    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }
}
