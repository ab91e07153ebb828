//! Live cursor state
//!
//! The per-device position records behind the published snapshot. Each
//! tracked device gets one [`Cursor`] that is refreshed on every sample
//! and expires after the liveness window when the device goes quiet.
//!
//! # State machine (per cursor)
//!
//! ```text
//! Absent ──first sample──> Active ──sample within window──> Active
//!                            │
//!                            ├─ liveness expiry ─────> Absent
//!                            ├─ explicit removal ────> Absent
//!                            └─ window blur (all) ───> Absent
//! ```

mod tracker;

pub use tracker::{ClampFrame, Cursor, CursorTracker, SampleKind};
