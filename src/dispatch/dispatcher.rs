//! Event Dispatcher
//!
//! The single entry point for raw input. Each accepted event runs the
//! resolve → bind → observe pipeline across the device registry, zone
//! binder and cursor tracker, and every call returns a fresh snapshot for
//! publication.
//!
//! Every operation is total: unknown devices register themselves, bind
//! requests without zones stay unbound and retry on the next sample, and
//! cancel/leave signals for unknown devices are silent no-ops.

use std::time::Instant;

use tracing::{debug, trace};

use crate::config::Config;
use crate::cursor::{ClampFrame, CursorTracker, SampleKind};
use crate::dispatch::{CursorView, PointerEvent, Snapshot};
use crate::registry::{DeviceRegistry, LogicalId, PointerClass, RawPointerId};
use crate::utils::Point;
use crate::zones::{SurfaceProvider, ZoneBinder, ZoneDirectory};

/// Coordinates the whole multiplexing pipeline.
///
/// Owns all mutable state; the component tables are never reachable from
/// outside, so no other code can mutate them. Construct one instance per
/// display session (or per test).
pub struct EventDispatcher {
    registry: DeviceRegistry,
    zones: ZoneDirectory,
    binder: ZoneBinder,
    tracker: CursorTracker,
    events_processed: u64,
    events_ignored: u64,
}

impl EventDispatcher {
    /// Create a dispatcher from the tracking configuration
    pub fn new(config: &Config) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            zones: ZoneDirectory::new(),
            binder: ZoneBinder::new(),
            tracker: CursorTracker::new(
                config.tracker.liveness_window(),
                config.zones.padding_px,
            ),
            events_processed: 0,
            events_ignored: 0,
        }
    }

    /// Process one raw pointer event and return the resulting snapshot.
    ///
    /// Touch-class events are discarded before any state is touched: touch
    /// input is ambient on touchscreens and must not become a player
    /// device. Move passes also sweep stale cursors, so expiry happens
    /// even between timer ticks.
    pub fn dispatch(&mut self, event: &PointerEvent, now: Instant) -> Snapshot {
        if let Some(class) = event.class() {
            if !class.is_tracked() {
                trace!("Ignoring {:?} pointer event", class);
                self.events_ignored += 1;
                return self.snapshot();
            }
        }

        match event {
            PointerEvent::Move { raw_id, x, y, class } => {
                self.expire_and_log(now);
                self.track_sample(*raw_id, *class, Point::new(*x, *y), SampleKind::Move, now);
            }
            PointerEvent::Down { raw_id, x, y, class } => {
                self.track_sample(*raw_id, *class, Point::new(*x, *y), SampleKind::Down, now);
            }
            PointerEvent::Up { raw_id, x, y, class } => {
                self.track_sample(*raw_id, *class, Point::new(*x, *y), SampleKind::Up, now);
            }
            PointerEvent::Cancel { raw_id } => {
                if let Some(identity) = self.registry.release(*raw_id) {
                    self.binder.unbind_all(&identity.logical_id);
                    self.tracker.remove(&identity.logical_id);
                }
            }
            PointerEvent::Leave { raw_id } => {
                // The device may come back; only its cursor goes away.
                if let Some(identity) = self.registry.lookup(*raw_id) {
                    let logical_id = identity.logical_id.clone();
                    self.tracker.remove(&logical_id);
                }
            }
            PointerEvent::Blur => {
                self.tracker.clear();
            }
        }

        self.events_processed += 1;
        self.snapshot()
    }

    /// Rescan zones through the provider and return a fresh snapshot.
    ///
    /// Driven at startup, on viewport resize and on the polling interval.
    pub fn rescan_zones(&mut self, provider: &dyn SurfaceProvider) -> Snapshot {
        self.zones.rescan(provider);
        self.snapshot()
    }

    /// Sweep stale cursors and return a fresh snapshot.
    ///
    /// Driven by the expiry interval so cursors disappear even when no
    /// input arrives at all.
    pub fn expire_tick(&mut self, now: Instant) -> Snapshot {
        self.expire_and_log(now);
        self.snapshot()
    }

    /// End the click pulse for one cursor and return a fresh snapshot.
    ///
    /// A pulse whose cursor is already gone is discarded silently.
    pub fn end_press_pulse(&mut self, logical_id: &LogicalId) -> Snapshot {
        self.tracker.end_press_pulse(logical_id);
        self.snapshot()
    }

    /// The logical id currently mapped to a raw pointer id, if any.
    ///
    /// Used by the service loop to address the delayed pulse task.
    pub fn logical_for_raw(&self, raw_id: RawPointerId) -> Option<LogicalId> {
        self.registry
            .lookup(raw_id)
            .map(|identity| identity.logical_id.clone())
    }

    /// Build the immutable snapshot of the current state.
    ///
    /// Cursors appear in creation order. A cursor whose device has been
    /// released is omitted, which keeps the published set a subset of the
    /// registered devices.
    pub fn snapshot(&self) -> Snapshot {
        let cursors = self
            .tracker
            .iter()
            .filter_map(|(logical_id, cursor)| {
                let identity = self.registry.identity_of(logical_id)?;
                let zone_id = self.binder.binding(logical_id);
                let label = match zone_id {
                    Some(zone_id) => zone_id.0,
                    None => self.registry.ordinal(logical_id)? as u32,
                };
                Some(CursorView {
                    logical_id: logical_id.clone(),
                    color: identity.color,
                    zone_id,
                    label,
                    position: cursor.position,
                    pressed: cursor.pressed,
                })
            })
            .collect();

        Snapshot {
            cursors,
            device_count: self.registry.device_count(),
            zone_count: self.zones.zone_count(),
        }
    }

    /// Total events that ran the pipeline
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Total events discarded by the class filter
    pub fn events_ignored(&self) -> u64 {
        self.events_ignored
    }

    fn track_sample(
        &mut self,
        raw_id: RawPointerId,
        class: PointerClass,
        point: Point,
        kind: SampleKind,
        now: Instant,
    ) {
        let logical_id = self.registry.resolve(raw_id, class).logical_id.clone();

        // Re-attempted on every sample until zones exist.
        let zone_id = self
            .binder
            .bind_if_unbound(&logical_id, self.zones.current_zones());

        // A binding that the latest rescan no longer resolves degrades to
        // unclamped coordinates rather than failing.
        let zone_bounds = zone_id
            .and_then(|zone_id| self.zones.zone_by_id(zone_id))
            .map(|zone| zone.bounds);

        let frame = ClampFrame {
            origin: self.zones.origin(),
            zone_bounds,
        };
        self.tracker.observe(&logical_id, point, kind, &frame, now);
    }

    fn expire_and_log(&mut self, now: Instant) {
        let expired = self.tracker.expire_stale(now);
        if !expired.is_empty() {
            debug!("Expired {} stale cursors", expired.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::registry::PointerClass;
    use crate::utils::Rect;
    use crate::zones::{StaticSurfaceProvider, SurfaceInfo, ZoneId};

    fn two_zone_provider() -> StaticSurfaceProvider {
        StaticSurfaceProvider::new(
            Point::new(0.0, 0.0),
            vec![
                SurfaceInfo {
                    zone_attr: Some(1),
                    bounds: Rect::new(0.0, 0.0, 400.0, 300.0),
                },
                SurfaceInfo {
                    zone_attr: Some(2),
                    bounds: Rect::new(400.0, 0.0, 400.0, 300.0),
                },
            ],
        )
    }

    fn dispatcher() -> EventDispatcher {
        EventDispatcher::new(&Config::default())
    }

    fn mouse_move(raw_id: u32, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            raw_id,
            x,
            y,
            class: PointerClass::Mouse,
        }
    }

    #[test]
    fn test_move_registers_binds_and_tracks() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());

        let snapshot = dispatcher.dispatch(&mouse_move(1, 100.0, 100.0), Instant::now());

        assert_eq!(snapshot.cursors.len(), 1);
        assert_eq!(snapshot.device_count, 1);
        assert_eq!(snapshot.zone_count, 2);
        assert_eq!(snapshot.cursors[0].zone_id, Some(ZoneId(1)));
        assert_eq!(snapshot.cursors[0].position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_touch_events_touch_nothing() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());

        let snapshot = dispatcher.dispatch(
            &PointerEvent::Down {
                raw_id: 9,
                x: 50.0,
                y: 50.0,
                class: PointerClass::Touch,
            },
            Instant::now(),
        );

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.device_count, 0);
        assert_eq!(dispatcher.events_ignored(), 1);
        assert_eq!(dispatcher.events_processed(), 0);
    }

    #[test]
    fn test_round_robin_assignment_across_devices() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());
        let now = Instant::now();

        let snap = dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(1)));

        let snap = dispatcher.dispatch(&mouse_move(2, 500.0, 10.0), now);
        assert_eq!(snap.cursors[1].zone_id, Some(ZoneId(2)));

        // Third device wraps back onto the first zone
        let snap = dispatcher.dispatch(&mouse_move(3, 10.0, 10.0), now);
        assert_eq!(snap.cursors[2].zone_id, Some(ZoneId(1)));
    }

    #[test]
    fn test_unbound_until_zones_appear() {
        let mut dispatcher = dispatcher();
        let now = Instant::now();

        let snap = dispatcher.dispatch(&mouse_move(1, 700.0, 50.0), now);
        assert_eq!(snap.cursors[0].zone_id, None);
        // Unclamped pass-through while unbound
        assert_eq!(snap.cursors[0].position, Point::new(700.0, 50.0));
        // Badge falls back to the registration ordinal
        assert_eq!(snap.cursors[0].label, 1);

        dispatcher.rescan_zones(&two_zone_provider());

        let snap = dispatcher.dispatch(&mouse_move(1, 700.0, 50.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(1)));
        assert_eq!(snap.cursors[0].label, 1);
        // Now clamped into zone 1
        assert_eq!(snap.cursors[0].position, Point::new(390.0, 50.0));
    }

    #[test]
    fn test_cancel_releases_everything() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());
        let now = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        let snap = dispatcher.dispatch(&PointerEvent::Cancel { raw_id: 1 }, now);

        assert!(snap.is_empty());
        assert_eq!(snap.device_count, 0);

        // The raw id comes back as a brand-new device on the next zone
        // in round-robin order.
        let snap = dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(2)));
    }

    #[test]
    fn test_cancel_unknown_raw_id_is_silent() {
        let mut dispatcher = dispatcher();
        let snap = dispatcher.dispatch(&PointerEvent::Cancel { raw_id: 42 }, Instant::now());
        assert!(snap.is_empty());
        assert_eq!(snap.device_count, 0);
    }

    #[test]
    fn test_leave_keeps_identity_and_binding() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());
        let now = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        let snap = dispatcher.dispatch(&PointerEvent::Leave { raw_id: 1 }, now);

        assert!(snap.is_empty());
        assert_eq!(snap.device_count, 1);

        // Returning pointer keeps its zone
        let snap = dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(1)));
    }

    #[test]
    fn test_blur_clears_all_cursors() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());
        let now = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        dispatcher.dispatch(&mouse_move(2, 500.0, 10.0), now);

        let snap = dispatcher.dispatch(&PointerEvent::Blur, now);
        assert!(snap.is_empty());
        // Devices and bindings survive the blur
        assert_eq!(snap.device_count, 2);
    }

    #[test]
    fn test_move_pass_expires_stale_cursors() {
        let mut dispatcher = dispatcher();
        dispatcher.rescan_zones(&two_zone_provider());
        let start = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), start);
        let snap = dispatcher.dispatch(&mouse_move(2, 500.0, 10.0), start + Duration::from_millis(2100));

        assert_eq!(snap.cursors.len(), 1);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(2)));
    }

    #[test]
    fn test_stale_binding_degrades_to_unclamped() {
        let mut dispatcher = dispatcher();
        let mut provider = two_zone_provider();
        dispatcher.rescan_zones(&provider);
        let now = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);

        // Zone 1 disappears; the binding stays but clamping passes through
        provider.set_surfaces(vec![SurfaceInfo {
            zone_attr: Some(2),
            bounds: Rect::new(400.0, 0.0, 400.0, 300.0),
        }]);
        dispatcher.rescan_zones(&provider);

        let snap = dispatcher.dispatch(&mouse_move(1, 9000.0, 9000.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(1)));
        assert_eq!(snap.cursors[0].position, Point::new(9000.0, 9000.0));
    }

    #[test]
    fn test_rescan_rect_swap_follows_zone_id() {
        let mut dispatcher = dispatcher();
        let mut provider = two_zone_provider();
        dispatcher.rescan_zones(&provider);
        let now = Instant::now();

        dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);

        // The surfaces swap rectangles while keeping their ids
        provider.set_surfaces(vec![
            SurfaceInfo {
                zone_attr: Some(1),
                bounds: Rect::new(400.0, 0.0, 400.0, 300.0),
            },
            SurfaceInfo {
                zone_attr: Some(2),
                bounds: Rect::new(0.0, 0.0, 400.0, 300.0),
            },
        ]);
        dispatcher.rescan_zones(&provider);

        // Device 1 is clamped into the rectangle now reported under its
        // zone id, not the old one.
        let snap = dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        assert_eq!(snap.cursors[0].zone_id, Some(ZoneId(1)));
        assert_eq!(snap.cursors[0].position, Point::new(410.0, 10.0));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_mutation() {
        let mut dispatcher = dispatcher();
        let now = Instant::now();

        let before = dispatcher.dispatch(&mouse_move(1, 10.0, 10.0), now);
        dispatcher.dispatch(&mouse_move(1, 99.0, 99.0), now);

        assert_eq!(before.cursors[0].position, Point::new(10.0, 10.0));
    }
}
