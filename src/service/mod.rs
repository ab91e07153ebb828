//! Service runtime
//!
//! Wraps the event dispatcher in a tokio task that owns all mutable state
//! for one display session. The task multiplexes the host event queue,
//! the zone rescan interval, the cursor expiry interval and the delayed
//! press-pulse completions through one `select!` loop, so every state
//! transition applies fully before the next one starts and no locking
//! discipline is needed.
//!
//! The timers live inside the task: shutting the service down (or simply
//! dropping its handle) cancels them with it, leaving no free-running
//! globals behind.

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::dispatch::{EventDispatcher, HostEvent, HostSignal, PointerEvent, Snapshot};
use crate::registry::LogicalId;
use crate::zones::SurfaceProvider;

/// Service result type
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Service lifecycle errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service loop is gone; events can no longer be delivered
    #[error("service event channel closed")]
    ChannelClosed,

    /// The service task ended abnormally
    #[error("service task failed")]
    TaskFailed,
}

/// The pointer multiplexing service for one display session.
///
/// Construct with the session configuration and the presentation layer's
/// [`SurfaceProvider`], then [`start`](MultiplexerService::start) it to
/// get a [`ServiceHandle`].
pub struct MultiplexerService {
    config: Config,
    provider: Box<dyn SurfaceProvider + Send>,
}

impl MultiplexerService {
    /// Create a service over the given surface provider
    pub fn new(config: Config, provider: impl SurfaceProvider + Send + 'static) -> Self {
        Self {
            config,
            provider: Box::new(provider),
        }
    }

    /// Start the service loop.
    ///
    /// Performs the startup zone scan, then spawns the owning task. The
    /// returned handle is the only way in (events) and out (snapshots).
    pub fn start(self) -> ServiceHandle {
        let (events_tx, events_rx) = mpsc::channel(self.config.service.event_queue_depth);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::empty());

        info!(
            "Starting multiplexer service (rescan every {} ms, expiry sweep every {} ms)",
            self.config.zones.rescan_interval_ms, self.config.tracker.expiry_tick_ms
        );

        let task = tokio::spawn(run_loop(
            self.config,
            self.provider,
            events_rx,
            shutdown_rx,
            snapshot_tx,
        ));

        ServiceHandle {
            events_tx,
            snapshot_rx,
            shutdown_tx,
            task,
        }
    }
}

/// Handle to a running [`MultiplexerService`].
pub struct ServiceHandle {
    events_tx: mpsc::Sender<HostEvent>,
    snapshot_rx: watch::Receiver<Snapshot>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ServiceHandle {
    /// Deliver one host event to the service loop
    pub async fn send(&self, event: HostEvent) -> Result<()> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| ServiceError::ChannelClosed)
    }

    /// Subscribe to published snapshots.
    ///
    /// The receiver yields a change notification after every processed
    /// event and every timer tick.
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// The most recently published snapshot
    pub fn latest(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the service and wait for its task to finish
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(()).await;
        self.task.await.map_err(|_| ServiceError::TaskFailed)
    }
}

async fn run_loop(
    config: Config,
    provider: Box<dyn SurfaceProvider + Send>,
    mut events_rx: mpsc::Receiver<HostEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
    snapshot_tx: watch::Sender<Snapshot>,
) {
    let mut dispatcher = EventDispatcher::new(&config);

    // Startup scan, before the first event can arrive
    snapshot_tx.send_replace(dispatcher.rescan_zones(provider.as_ref()));

    let rescan_period = config.zones.rescan_interval();
    let expiry_period = config.tracker.expiry_tick();
    let press_pulse = config.tracker.press_pulse();

    let mut rescan_timer =
        tokio::time::interval_at(tokio::time::Instant::now() + rescan_period, rescan_period);
    let mut expiry_timer =
        tokio::time::interval_at(tokio::time::Instant::now() + expiry_period, expiry_period);

    // Pulse completions re-enter the loop as queued work instead of
    // mutating from the spawned timer tasks.
    let (pulse_tx, mut pulse_rx) = mpsc::channel::<LogicalId>(config.service.event_queue_depth);

    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(HostEvent::Pointer(event)) => {
                    let now = tokio::time::Instant::now().into_std();
                    let snapshot = dispatcher.dispatch(&event, now);

                    if let PointerEvent::Down { raw_id, class, .. } = &event {
                        if class.is_tracked() {
                            if let Some(logical_id) = dispatcher.logical_for_raw(*raw_id) {
                                let pulse_tx = pulse_tx.clone();
                                tokio::spawn(async move {
                                    tokio::time::sleep(press_pulse).await;
                                    let _ = pulse_tx.send(logical_id).await;
                                });
                            }
                        }
                    }

                    snapshot_tx.send_replace(snapshot);
                }
                Some(HostEvent::Signal(HostSignal::ViewportResized)) => {
                    debug!("Viewport resized, rescanning zones");
                    snapshot_tx.send_replace(dispatcher.rescan_zones(provider.as_ref()));
                }
                None => {
                    debug!("Event channel closed, stopping service loop");
                    break;
                }
            },

            Some(logical_id) = pulse_rx.recv() => {
                snapshot_tx.send_replace(dispatcher.end_press_pulse(&logical_id));
            }

            _ = rescan_timer.tick() => {
                snapshot_tx.send_replace(dispatcher.rescan_zones(provider.as_ref()));
            }

            _ = expiry_timer.tick() => {
                let now = tokio::time::Instant::now().into_std();
                snapshot_tx.send_replace(dispatcher.expire_tick(now));
            }

            _ = shutdown_rx.recv() => {
                info!("Multiplexer service shutdown requested");
                break;
            }
        }
    }

    info!(
        "Multiplexer service stopped ({} events processed, {} ignored)",
        dispatcher.events_processed(),
        dispatcher.events_ignored()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::registry::PointerClass;
    use crate::utils::{Point, Rect};
    use crate::zones::{StaticSurfaceProvider, SurfaceInfo};

    /// Test provider whose surfaces can be swapped while the service runs
    #[derive(Clone)]
    struct SharedProvider(Arc<Mutex<StaticSurfaceProvider>>);

    impl SharedProvider {
        fn new(inner: StaticSurfaceProvider) -> Self {
            Self(Arc::new(Mutex::new(inner)))
        }

        fn set_surfaces(&self, surfaces: Vec<SurfaceInfo>) {
            self.0.lock().unwrap().set_surfaces(surfaces);
        }
    }

    impl SurfaceProvider for SharedProvider {
        fn origin(&self) -> Point {
            self.0.lock().unwrap().origin()
        }

        fn surfaces(&self) -> Vec<SurfaceInfo> {
            self.0.lock().unwrap().surfaces()
        }
    }

    fn surfaces(count: u32) -> Vec<SurfaceInfo> {
        (0..count)
            .map(|index| SurfaceInfo {
                zone_attr: Some(index + 1),
                bounds: Rect::new(index as f64 * 400.0, 0.0, 400.0, 300.0),
            })
            .collect()
    }

    fn mouse_move(raw_id: u32, x: f64, y: f64) -> HostEvent {
        HostEvent::Pointer(PointerEvent::Move {
            raw_id,
            x,
            y,
            class: PointerClass::Mouse,
        })
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<Snapshot>, mut predicate: F) -> Snapshot
    where
        F: FnMut(&Snapshot) -> bool,
    {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if predicate(&snapshot) {
                return snapshot;
            }
            rx.changed().await.expect("service loop ended unexpectedly");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_scan_publishes_zones() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(2));
        let handle = MultiplexerService::new(Config::default(), provider).start();

        let mut rx = handle.snapshots();
        let snapshot = wait_for(&mut rx, |snapshot| snapshot.zone_count == 2).await;
        assert!(snapshot.is_empty());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_produces_bound_cursor() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(2));
        let handle = MultiplexerService::new(Config::default(), provider).start();
        let mut rx = handle.snapshots();
        wait_for(&mut rx, |snapshot| snapshot.zone_count == 2).await;

        handle.send(mouse_move(1, 50.0, 50.0)).await.unwrap();

        let snapshot = wait_for(&mut rx, |snapshot| !snapshot.is_empty()).await;
        assert_eq!(snapshot.cursors[0].zone_id, Some(crate::zones::ZoneId(1)));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_pulse_ends_after_delay() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(1));
        let handle = MultiplexerService::new(Config::default(), provider).start();
        let mut rx = handle.snapshots();
        wait_for(&mut rx, |snapshot| snapshot.zone_count == 1).await;

        handle
            .send(HostEvent::Pointer(PointerEvent::Down {
                raw_id: 1,
                x: 50.0,
                y: 50.0,
                class: PointerClass::Mouse,
            }))
            .await
            .unwrap();

        let snapshot = wait_for(&mut rx, |snapshot| {
            snapshot.cursors.first().is_some_and(|cursor| cursor.pressed)
        })
        .await;
        assert_eq!(snapshot.cursors.len(), 1);

        // The 200 ms pulse task fires under the paused clock and lowers
        // the flag without any further input.
        let snapshot = wait_for(&mut rx, |snapshot| {
            snapshot.cursors.first().is_some_and(|cursor| !cursor.pressed)
        })
        .await;
        assert_eq!(snapshot.cursors.len(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_expires_without_input() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(1));
        let handle = MultiplexerService::new(Config::default(), provider).start();
        let mut rx = handle.snapshots();
        wait_for(&mut rx, |snapshot| snapshot.zone_count == 1).await;

        handle.send(mouse_move(1, 50.0, 50.0)).await.unwrap();
        wait_for(&mut rx, |snapshot| !snapshot.is_empty()).await;

        // No further input: the expiry interval sweeps the cursor away
        // once the liveness window elapses on the virtual clock.
        let snapshot = wait_for(&mut rx, |snapshot| snapshot.is_empty()).await;
        assert_eq!(snapshot.device_count, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_triggers_immediate_rescan() {
        let provider = SharedProvider::new(StaticSurfaceProvider::new(
            Point::default(),
            surfaces(1),
        ));
        let handle =
            MultiplexerService::new(Config::default(), provider.clone()).start();
        let mut rx = handle.snapshots();
        wait_for(&mut rx, |snapshot| snapshot.zone_count == 1).await;

        provider.set_surfaces(surfaces(3));
        handle
            .send(HostEvent::Signal(HostSignal::ViewportResized))
            .await
            .unwrap();

        wait_for(&mut rx, |snapshot| snapshot.zone_count == 3).await;

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_shutdown_fails() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(1));
        let handle = MultiplexerService::new(Config::default(), provider).start();

        let events_tx = handle.events_tx.clone();
        handle.shutdown().await.unwrap();

        let result = events_tx.send(mouse_move(1, 0.0, 0.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_empties_snapshot_regardless_of_recency() {
        let provider = StaticSurfaceProvider::new(Point::default(), surfaces(2));
        let handle = MultiplexerService::new(Config::default(), provider).start();
        let mut rx = handle.snapshots();
        wait_for(&mut rx, |snapshot| snapshot.zone_count == 2).await;

        handle.send(mouse_move(1, 50.0, 50.0)).await.unwrap();
        handle.send(mouse_move(2, 450.0, 50.0)).await.unwrap();
        wait_for(&mut rx, |snapshot| snapshot.cursors.len() == 2).await;

        handle
            .send(HostEvent::Pointer(PointerEvent::Blur))
            .await
            .unwrap();

        let snapshot = wait_for(&mut rx, |snapshot| snapshot.is_empty()).await;
        assert_eq!(snapshot.device_count, 2);

        handle.shutdown().await.unwrap();
    }
}
