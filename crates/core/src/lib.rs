//! Dropkit Core
//!
//! Platform-agnostic geometry and data model for the drag-and-drop engine.
//!
//! This crate holds the pure half of the engine:
//! - Axis-aligned rectangle math (overlap, percent overlap, midpoints)
//! - Before/after placement classification along a container's primary axis
//! - Rect-list transforms used to open and close the visual gap left by a
//!   dragged-out item
//!
//! Nothing here touches a visual tree or mutates shared state; every
//! transform returns a new value. Malformed geometry (negative dimensions,
//! out-of-range indices) is a caller contract violation and is asserted
//! rather than coerced, since a silent fix-up here corrupts the layout
//! illusion for the rest of the engine.

use serde::{Deserialize, Serialize};

/// Opaque handle to a host visual element.
/// The embedding host decides what this maps to (a DOM node, a widget id).
pub type ElementId = u64;

/// A 2D point or offset in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this offset.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Position {
    type Output = Position;

    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

/// Inline padding of a container element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    /// Create padding with the same value on all four sides.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            left: value,
            right: value,
            bottom: value,
        }
    }
}

/// Primary flow axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Items flow left to right.
    Horizontal,
    /// Items flow top to bottom.
    #[default]
    Vertical,
}

/// Whether a dragged item lands before or after a given sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
}

/// Fraction of a rectangle's extent covered by an intersection, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentOverlap {
    pub x: f64,
    pub y: f64,
}

/// A draggable unit. The id is unique within the drag session's source
/// list, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
}

impl Item {
    /// Create an item with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The answer to "if dropped now, where would this item land".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverResult {
    /// Target index within the hovered zone's list.
    pub index: usize,
    /// The sibling the dragged item lands before or after.
    pub item: Item,
    /// The element used for the spacing animation.
    pub element: ElementId,
    /// Which side of the sibling the dragged item lands on.
    pub placement: Placement,
}

/// An axis-aligned rectangle in viewport coordinates (pixels).
///
/// Immutable value type: every transform produces a new instance.
/// Invariant: `width >= 0` and `height >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(width >= 0.0, "rect width must be non-negative");
        debug_assert!(height >= 0.0, "rect height must be non-negative");
        Self { x, y, width, height }
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner of the rectangle.
    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Check whether this rectangle intersects another.
    ///
    /// The comparisons are strict, so rectangles whose edges exactly meet
    /// still count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.bottom() < other.y
            || other.right() < self.x
            || other.bottom() < self.y)
    }

    /// Fraction of this rectangle's width/height covered by the
    /// intersection with `other`, clamped to `>= 0`.
    ///
    /// Used to rank candidate drop zones by how much of the dragged item's
    /// footprint lies inside each.
    pub fn percent_overlap(&self, other: &Rect) -> PercentOverlap {
        debug_assert!(
            self.width > 0.0 && self.height > 0.0,
            "percent_overlap requires a rect with positive dimensions"
        );
        let max_x = self.right().min(other.right());
        let min_x = self.x.max(other.x);
        let max_y = self.bottom().min(other.bottom());
        let min_y = self.y.max(other.y);
        PercentOverlap {
            x: (max_x - min_x).max(0.0) / self.width,
            y: (max_y - min_y).max(0.0) / self.height,
        }
    }

    /// Center point of the rectangle.
    pub fn midpoint(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Classify where this rectangle lands relative to `other` along the
    /// primary axis.
    ///
    /// A midpoint strictly greater than `other`'s yields `Before` (the
    /// dragged item is positioned after `other` in visual order when its
    /// center trails); ties resolve to `After`.
    pub fn placement(&self, other: &Rect, axis: Axis) -> Placement {
        let (own, theirs) = match axis {
            Axis::Horizontal => (self.midpoint().x, other.midpoint().x),
            Axis::Vertical => (self.midpoint().y, other.midpoint().y),
        };
        if own > theirs {
            Placement::Before
        } else {
            Placement::After
        }
    }

    /// Shrink the rectangle by a container's inline padding, yielding
    /// content-box geometry from border-box geometry.
    pub fn inset(&self, padding: Padding) -> Rect {
        Rect::new(
            self.x + padding.left,
            self.y + padding.top,
            self.width - (padding.left + padding.right),
            self.height - (padding.top + padding.bottom),
        )
    }

    /// Translate the rectangle by an offset.
    pub fn translated(&self, offset: Position) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Resize the rectangle by an offset applied to width/height.
    pub fn resized_by(&self, offset: Position) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.width + offset.x,
            self.height + offset.y,
        )
    }
}

/// Resize the rectangle at `start_index` by `offset` and translate every
/// subsequent rectangle by the same offset.
///
/// Preserves a monotonic non-overlapping layout; used to open or close the
/// visual gap left by a dragged-out item.
pub fn grow_or_shrink_rect_in_list(rects: &[Rect], start_index: usize, offset: Position) -> Vec<Rect> {
    debug_assert!(start_index < rects.len(), "start_index out of bounds");
    rects
        .iter()
        .enumerate()
        .map(|(i, rect)| {
            if i < start_index {
                *rect
            } else if i == start_index {
                rect.resized_by(offset)
            } else {
                rect.translated(offset)
            }
        })
        .collect()
}

/// Shift all rectangles from `start_index` onward by a delta, without
/// resizing.
///
/// Used during auto-scroll to keep sibling placeholders visually aligned.
pub fn translate_rects_by(rects: &[Rect], start_index: usize, offset: Position) -> Vec<Rect> {
    debug_assert!(start_index < rects.len(), "start_index out of bounds");
    rects
        .iter()
        .enumerate()
        .map(|(i, rect)| {
            if i < start_index {
                *rect
            } else {
                rect.translated(offset)
            }
        })
        .collect()
}
