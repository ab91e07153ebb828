//! Interaction zones
//!
//! Discovery of the rectangular screen regions that devices get bound to,
//! and the round-robin assignment of devices to those regions.
//!
//! The presentation layer owns the actual on-screen surfaces; it exposes
//! them to this module through the [`SurfaceProvider`] trait as a list of
//! tagged rectangles measured at call time. The [`ZoneDirectory`] turns
//! each scan into an addressable zone list and the [`ZoneBinder`] keeps
//! the per-device assignments stable across rescans.

mod binder;
mod directory;

pub use binder::ZoneBinder;
pub use directory::ZoneDirectory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{Point, Rect};

/// Numeric zone identifier.
///
/// Comes from the surface's declared attribute when present, otherwise
/// from the 1-based positional index within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One interaction zone: an addressable rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    /// Zone identifier
    pub id: ZoneId,
    /// Bounding rectangle in viewport coordinates, measured at scan time
    pub bounds: Rect,
}

/// One tagged interaction surface as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Declared numeric zone id, if the surface carries one
    pub zone_attr: Option<u32>,
    /// Live bounding rectangle in viewport coordinates
    pub bounds: Rect,
}

/// Source of tagged interaction surfaces.
///
/// Implemented by the presentation layer. `surfaces` is queried on every
/// rescan and must measure bounds at call time; the returned order is the
/// tagging order and drives the round-robin assignment sequence, nothing
/// else. `origin` is the top-left corner of the tracking surface that all
/// cursor coordinates are made relative to.
pub trait SurfaceProvider {
    /// Top-left corner of the tracking surface in viewport coordinates
    fn origin(&self) -> Point;

    /// The currently rendered interaction surfaces, in tagging order
    fn surfaces(&self) -> Vec<SurfaceInfo>;
}

/// A [`SurfaceProvider`] over a fixed set of rectangles.
///
/// Backs the headless driver (zones from the config file) and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSurfaceProvider {
    origin: Point,
    surfaces: Vec<SurfaceInfo>,
}

impl StaticSurfaceProvider {
    /// Create a provider with the given tracking-surface origin and
    /// surface list
    pub fn new(origin: Point, surfaces: Vec<SurfaceInfo>) -> Self {
        Self { origin, surfaces }
    }

    /// Replace the surface list, simulating surfaces that moved or resized
    pub fn set_surfaces(&mut self, surfaces: Vec<SurfaceInfo>) {
        self.surfaces = surfaces;
    }
}

impl SurfaceProvider for StaticSurfaceProvider {
    fn origin(&self) -> Point {
        self.origin
    }

    fn surfaces(&self) -> Vec<SurfaceInfo> {
        self.surfaces.clone()
    }
}
