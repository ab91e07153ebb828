//! Event dispatch
//!
//! The single entry point that receives raw input events, normalizes
//! them, feeds the registry/binder/tracker pipeline and produces the
//! immutable snapshot consumed by the presentation layer.
//!
//! # Architecture
//!
//! ```text
//! Raw pointer stream
//!       ↓
//! ┌─────────────────────────┐
//! │  EventDispatcher        │ ← class filter, event routing, statistics
//! └─────────────────────────┘
//!       ↓            ↓            ↓
//! ┌───────────┐ ┌───────────┐ ┌───────────────┐
//! │  Device   │ │   Zone    │ │    Cursor     │
//! │ Registry  │ │  Binder   │ │    Tracker    │
//! └───────────┘ └───────────┘ └───────────────┘
//!       ↓
//! Snapshot (per processed event)
//! ```

mod dispatcher;
mod events;
mod snapshot;

pub use dispatcher::EventDispatcher;
pub use events::{HostEvent, HostSignal, PointerEvent};
pub use snapshot::{CursorView, Snapshot};
