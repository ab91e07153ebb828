//! # multipointer
//!
//! Multi-device pointer multiplexing for shared-display sessions.
//!
//! Multiple physical pointing devices (mice, pens) connected to one
//! machine become independent, identity-stable input streams, each bound
//! to one of several concurrently visible screen regions ("zones"), so N
//! people can each control a dedicated zone with their own mouse on a
//! single shared display.
//!
//! # Architecture
//!
//! ```text
//! multipointer
//!   ├─> Device Registry (stable identity + color per device)
//!   ├─> Zone Directory  (discovers interaction regions via SurfaceProvider)
//!   ├─> Zone Binder     (round-robin device -> zone assignment)
//!   ├─> Cursor Tracker  (zone-clamped, liveness-windowed positions)
//!   ├─> Event Dispatcher (raw events in, immutable snapshots out)
//!   └─> Service runtime (tokio loop: event queue, rescan + expiry timers)
//! ```
//!
//! # Data Flow
//!
//! **Input path:** host pointer stream → [`ServiceHandle::send`] →
//! [`EventDispatcher`] → registry / binder / tracker
//!
//! **Output path:** [`Snapshot`] published on a watch channel after every
//! processed event and timer tick. This is the sole interface consumed by
//! the presentation layer.
//!
//! Everything is in-process and memory-resident for the duration of one
//! display session; nothing is persisted.
//!
//! [`ServiceHandle::send`]: service::ServiceHandle::send
//! [`EventDispatcher`]: dispatch::EventDispatcher
//! [`Snapshot`]: dispatch::Snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Session configuration
pub mod config;

/// Live cursor state and clamping
pub mod cursor;

/// Event dispatch and snapshot production
pub mod dispatch;

/// Device identity registry
pub mod registry;

/// Service runtime lifecycle
pub mod service;

/// Shared geometry utilities
pub mod utils;

/// Zone discovery and binding
pub mod zones;

// Re-export the types that make up the public surface of a session.
pub use config::Config;
pub use dispatch::{EventDispatcher, HostEvent, HostSignal, PointerEvent, Snapshot};
pub use registry::{Color, LogicalId, PointerClass, RawPointerId};
pub use service::{MultiplexerService, ServiceError, ServiceHandle};
pub use utils::{Point, Rect};
pub use zones::{StaticSurfaceProvider, SurfaceInfo, SurfaceProvider, Zone, ZoneId};
