//! Normalized host events
//!
//! The wire-level event shapes consumed by the dispatcher and the service
//! loop. They mirror what a host windowing system emits: a pointer stream
//! with per-device ids and classes, plus the global signals (device
//! cancel, pointer leave, window blur, viewport resize).
//!
//! All shapes are serde-tagged so the headless driver can read them as
//! JSON lines.

use serde::{Deserialize, Serialize};

use crate::registry::{PointerClass, RawPointerId};

/// One raw pointer event from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer moved to a viewport-absolute position
    Move {
        /// Backend-assigned pointer id
        raw_id: RawPointerId,
        /// Viewport x coordinate
        x: f64,
        /// Viewport y coordinate
        y: f64,
        /// Device class of the emitting pointer
        class: PointerClass,
    },

    /// Pointer button pressed
    Down {
        /// Backend-assigned pointer id
        raw_id: RawPointerId,
        /// Viewport x coordinate
        x: f64,
        /// Viewport y coordinate
        y: f64,
        /// Device class of the emitting pointer
        class: PointerClass,
    },

    /// Pointer button released
    Up {
        /// Backend-assigned pointer id
        raw_id: RawPointerId,
        /// Viewport x coordinate
        x: f64,
        /// Viewport y coordinate
        y: f64,
        /// Device class of the emitting pointer
        class: PointerClass,
    },

    /// Backend reported the device gone; its identity is discarded
    Cancel {
        /// Backend-assigned pointer id
        raw_id: RawPointerId,
    },

    /// Pointer left the tracked surface; the cursor is dropped but the
    /// identity and binding survive for its return
    Leave {
        /// Backend-assigned pointer id
        raw_id: RawPointerId,
    },

    /// The window lost focus; every cursor is dropped at once
    Blur,
}

impl PointerEvent {
    /// The device class carried by this event, for sample events
    pub fn class(&self) -> Option<PointerClass> {
        match self {
            PointerEvent::Move { class, .. }
            | PointerEvent::Down { class, .. }
            | PointerEvent::Up { class, .. } => Some(*class),
            _ => None,
        }
    }
}

/// Non-pointer host signals routed through the service loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostSignal {
    /// The viewport was resized; zones are rescanned immediately
    ViewportResized,
}

/// Any input the service loop accepts from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostEvent {
    /// A raw pointer event
    Pointer(PointerEvent),
    /// A non-pointer signal
    Signal(HostSignal),
}
