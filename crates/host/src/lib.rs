//! Dropkit Host Boundary
//!
//! The narrow interface between the drag-and-drop engine and whatever
//! renders the visual tree.
//!
//! This crate handles:
//! - Bounding-rectangle measurement and padding queries ([`MeasurementProvider`])
//! - Drag clone lifecycle and container scrolling ([`DragHost`])
//! - Pixel-string parsing for hosts that read inline styles
//! - A headless in-memory host for tests and non-visual embeddings
//!
//! The engine core never reaches into a UI framework directly; everything
//! it needs from the visual tree goes through these two traits, so the
//! state machine can be driven entirely by synthetic measurements.

use std::collections::HashMap;

use dropkit_core::{ElementId, Padding, Position, Rect};
use thiserror::Error;

/// Errors that can occur at the host boundary.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Element {0} is no longer attached to the visual tree")]
    DetachedElement(ElementId),

    #[error("Element {0} is not a scrollable container")]
    NotScrollable(ElementId),
}

/// Read-only geometry queries against the visual tree.
///
/// `measure` returns `None` for elements that have been removed from the
/// tree; async unmounts racing a drag are expected, so absence is a benign
/// answer rather than an error.
pub trait MeasurementProvider {
    /// Current bounding rectangle of an element, if it is still attached.
    fn measure(&self, element: ElementId) -> Option<Rect>;

    /// Inline padding of an element. Elements with no padding report zero.
    fn padding(&self, element: ElementId) -> Padding;
}

/// Side-effecting operations the interaction state machine needs from the
/// visual tree.
///
/// `spawn_clone` snapshots the source element's position and size into a
/// floating copy that tracks the pointer; the host is responsible for the
/// visual details (elevated z-order, grabbing cursor).
pub trait DragHost: MeasurementProvider {
    /// Create the floating drag clone from a source element.
    fn spawn_clone(&mut self, source: ElementId) -> Result<ElementId, HostError>;

    /// Move the drag clone so its top-left corner sits at `to`.
    fn move_clone(&mut self, clone: ElementId, to: Position) -> Result<(), HostError>;

    /// Remove the drag clone from the visual tree. Idempotent.
    fn remove_clone(&mut self, clone: ElementId);

    /// Scroll a container by a pixel delta.
    fn scroll_by(&mut self, container: ElementId, delta: Position) -> Result<(), HostError>;
}

/// Parse a CSS pixel string (`"12px"`) into a number.
///
/// Absent, empty, or malformed values parse to `0.0`, matching how inline
/// styles read back when no value was ever set.
pub fn parse_px(value: &str) -> f64 {
    value
        .strip_suffix("px")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// In-memory host implementation.
///
/// Backs elements with plain rectangle and padding maps; used by the
/// engine's tests and by headless embeddings that do their own rendering.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    rects: HashMap<ElementId, Rect>,
    paddings: HashMap<ElementId, Padding>,
    scroll_offsets: HashMap<ElementId, Position>,
    next_id: ElementId,
}

impl HeadlessHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with the given rectangle, returning its handle.
    pub fn insert(&mut self, rect: Rect) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        self.rects.insert(id, rect);
        id
    }

    /// Add an element with a rectangle and explicit padding.
    pub fn insert_padded(&mut self, rect: Rect, padding: Padding) -> ElementId {
        let id = self.insert(rect);
        self.paddings.insert(id, padding);
        id
    }

    /// Replace an element's rectangle (layout change).
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(existing) = self.rects.get_mut(&element) {
            *existing = rect;
        }
    }

    /// Remove an element, simulating an unmount racing the drag.
    pub fn detach(&mut self, element: ElementId) {
        self.rects.remove(&element);
        self.paddings.remove(&element);
        self.scroll_offsets.remove(&element);
    }

    /// Whether the element is still attached.
    pub fn is_attached(&self, element: ElementId) -> bool {
        self.rects.contains_key(&element)
    }

    /// Accumulated scroll offset of a container.
    pub fn scroll_offset(&self, container: ElementId) -> Position {
        self.scroll_offsets
            .get(&container)
            .copied()
            .unwrap_or_default()
    }
}

impl MeasurementProvider for HeadlessHost {
    fn measure(&self, element: ElementId) -> Option<Rect> {
        self.rects.get(&element).copied()
    }

    fn padding(&self, element: ElementId) -> Padding {
        self.paddings.get(&element).copied().unwrap_or_default()
    }
}

impl DragHost for HeadlessHost {
    fn spawn_clone(&mut self, source: ElementId) -> Result<ElementId, HostError> {
        let rect = self
            .rects
            .get(&source)
            .copied()
            .ok_or(HostError::DetachedElement(source))?;
        let clone = self.insert(rect);
        tracing::debug!("spawned drag clone {} from element {}", clone, source);
        Ok(clone)
    }

    fn move_clone(&mut self, clone: ElementId, to: Position) -> Result<(), HostError> {
        let rect = self
            .rects
            .get_mut(&clone)
            .ok_or(HostError::DetachedElement(clone))?;
        *rect = Rect::new(to.x, to.y, rect.width, rect.height);
        Ok(())
    }

    fn remove_clone(&mut self, clone: ElementId) {
        self.detach(clone);
    }

    fn scroll_by(&mut self, container: ElementId, delta: Position) -> Result<(), HostError> {
        if !self.rects.contains_key(&container) {
            return Err(HostError::DetachedElement(container));
        }
        let offset = self.scroll_offsets.entry(container).or_default();
        *offset = *offset + delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12px"), 12.0);
        assert_eq!(parse_px("0px"), 0.0);
        assert_eq!(parse_px("3.5px"), 3.5);
    }

    #[test]
    fn test_parse_px_absent_or_malformed() {
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
        assert_eq!(parse_px("px"), 0.0);
        assert_eq!(parse_px("12"), 0.0);
    }

    #[test]
    fn test_headless_measure_and_detach() {
        let mut host = HeadlessHost::new();
        let el = host.insert(Rect::new(0.0, 0.0, 100.0, 50.0));

        assert_eq!(host.measure(el), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert!(host.is_attached(el));

        host.detach(el);
        assert_eq!(host.measure(el), None);
        assert!(!host.is_attached(el));
    }

    #[test]
    fn test_headless_padding_defaults_to_zero() {
        let mut host = HeadlessHost::new();
        let plain = host.insert(Rect::new(0.0, 0.0, 10.0, 10.0));
        let padded = host.insert_padded(Rect::new(0.0, 0.0, 10.0, 10.0), Padding::uniform(4.0));

        assert_eq!(host.padding(plain), Padding::default());
        assert_eq!(host.padding(padded), Padding::uniform(4.0));
    }

    #[test]
    fn test_headless_clone_lifecycle() {
        let mut host = HeadlessHost::new();
        let source = host.insert(Rect::new(10.0, 20.0, 80.0, 40.0));

        let clone = host.spawn_clone(source).unwrap();
        assert_ne!(clone, source);
        assert_eq!(host.measure(clone), Some(Rect::new(10.0, 20.0, 80.0, 40.0)));

        host.move_clone(clone, Position::new(50.0, 60.0)).unwrap();
        assert_eq!(host.measure(clone), Some(Rect::new(50.0, 60.0, 80.0, 40.0)));

        host.remove_clone(clone);
        assert!(!host.is_attached(clone));
        // Removing again is a no-op.
        host.remove_clone(clone);
    }

    #[test]
    fn test_headless_clone_of_detached_source_fails() {
        let mut host = HeadlessHost::new();
        let source = host.insert(Rect::new(0.0, 0.0, 10.0, 10.0));
        host.detach(source);

        assert!(matches!(
            host.spawn_clone(source),
            Err(HostError::DetachedElement(_))
        ));
    }

    #[test]
    fn test_headless_scroll_accumulates() {
        let mut host = HeadlessHost::new();
        let container = host.insert(Rect::new(0.0, 0.0, 200.0, 400.0));

        host.scroll_by(container, Position::new(0.0, 10.0)).unwrap();
        host.scroll_by(container, Position::new(0.0, 5.0)).unwrap();

        assert_eq!(host.scroll_offset(container), Position::new(0.0, 15.0));
    }

    #[test]
    fn test_headless_scroll_detached_container_fails() {
        let mut host = HeadlessHost::new();
        let container = host.insert(Rect::new(0.0, 0.0, 200.0, 400.0));
        host.detach(container);

        assert!(host
            .scroll_by(container, Position::new(0.0, 10.0))
            .is_err());
    }
}
