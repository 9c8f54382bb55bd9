//! Coordinate transforms between the physical input frame and the visual frame.
//!
//! The physical frame is what pointer events and DOM measurements report. On a
//! portrait device the whole scene is rotated 90° clockwise so the player sees
//! a landscape layout; the visual frame is that rotated view. All functions
//! here are pure: rotation state and viewport extents are passed explicitly.
use serde::{Deserialize, Serialize};

use crate::constants::GEOMETRY_EPSILON;
use crate::numbers::all_positive_finite;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < GEOMETRY_EPSILON && (self.y - other.y).abs() < GEOMETRY_EPSILON
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle of the given size around a center point.
    #[must_use]
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < GEOMETRY_EPSILON
            && (self.y - other.y).abs() < GEOMETRY_EPSILON
            && (self.width - other.width).abs() < GEOMETRY_EPSILON
            && (self.height - other.height).abs() < GEOMETRY_EPSILON
    }
}

/// Extents of the physical viewport (what the browser reports).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero, negative or non-finite extents.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !all_positive_finite(&[self.width, self.height])
    }

    /// The same viewport measured with its axes exchanged.
    #[must_use]
    pub const fn swapped(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        Orientation::from_extents(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Taller-than-wide is portrait; square counts as landscape.
    #[must_use]
    pub fn from_extents(width: f64, height: f64) -> Self {
        if height > width {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }
}

/// The experience is landscape-only, so a portrait device gets the
/// compensating rotation.
#[must_use]
pub const fn is_rotation_active(orientation: Orientation) -> bool {
    matches!(orientation, Orientation::Portrait)
}

/// Map a physical-frame point into the visual frame.
///
/// Rotated: `(x, y) -> (viewport.height - y, x)`.
#[must_use]
pub fn to_visual_point(point: Point, viewport: Viewport, rotated: bool) -> Point {
    if !rotated || viewport.is_degenerate() {
        return point;
    }
    Point::new(viewport.height - point.y, point.x)
}

/// Inverse of [`to_visual_point`]; `viewport` is still the physical one.
#[must_use]
pub fn to_physical_point(point: Point, viewport: Viewport, rotated: bool) -> Point {
    if !rotated || viewport.is_degenerate() {
        return point;
    }
    Point::new(point.y, viewport.height - point.x)
}

/// Map a physical-frame rectangle into the visual frame.
///
/// When rotated, the center moves with [`to_visual_point`] and width and
/// height swap. A degenerate viewport leaves the rectangle unchanged.
#[must_use]
pub fn to_visual_rect(rect: Rect, viewport: Viewport, rotated: bool) -> Rect {
    if !rotated || viewport.is_degenerate() {
        return rect;
    }
    let center = to_visual_point(rect.center(), viewport, true);
    Rect::from_center(center, rect.height, rect.width)
}

/// Inverse of [`to_visual_rect`].
#[must_use]
pub fn to_physical_rect(rect: Rect, viewport: Viewport, rotated: bool) -> Rect {
    if !rotated || viewport.is_degenerate() {
        return rect;
    }
    let center = to_physical_point(rect.center(), viewport, true);
    Rect::from_center(center, rect.height, rect.width)
}
