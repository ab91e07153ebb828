//! Viewport geometry primitives
//!
//! Points and axis-aligned rectangles in viewport pixel coordinates, plus
//! the clamping function used to confine cursors to their zone. Clamping is
//! a pure function over its inputs so it can be tested without any of the
//! event-handling plumbing.

use serde::{Deserialize, Serialize};

/// A point in pixel coordinates.
///
/// Which frame the coordinates are in (viewport-absolute or
/// container-relative) is determined by context; [`Point::relative_to`]
/// converts between the two.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate in pixels
    pub x: f64,
    /// Vertical coordinate in pixels
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate this point into the frame anchored at `origin`
    pub fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge in pixels
    pub x: f64,
    /// Top edge in pixels
    pub y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Top edge
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Check if a point lies within this rectangle
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Translate this rectangle into the frame anchored at `origin`
    pub fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Clamp a point into `rect` shrunk by `padding` on all sides.
///
/// Each axis is corrected independently, so a point outside the rectangle
/// on only one axis keeps its other coordinate untouched. When the
/// rectangle is narrower than twice the padding the far edge wins, which
/// collapses that axis to a single coordinate instead of producing a range
/// inversion.
pub fn clamp_into_rect(point: Point, rect: Rect, padding: f64) -> Point {
    let min_x = rect.left() + padding;
    let max_x = rect.right() - padding;
    let min_y = rect.top() + padding;
    let max_y = rect.bottom() - padding;

    Point {
        x: point.x.max(min_x).min(max_x),
        y: point.y.max(min_y).min(max_y),
    }
}
