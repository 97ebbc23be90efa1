//! Auto-scroll and drop-spacing control.
//!
//! While a drag is live, pointer positions near a container's edge produce
//! scroll deltas that are applied once per animation tick (never per raw
//! pointer event, which would make scroll speed depend on event rate).
//! Insertion-point changes are tracked so the host re-runs the gap
//! animation only when the predicted drop position actually moved. Both
//! concerns are purely geometric: the underlying item lists are never
//! touched here — reordering commits only through the zone drop callbacks.

use dropkit_core::{
    grow_or_shrink_rect_in_list, Axis, ElementId, HoverResult, Placement, Position, Rect,
};
use dropkit_host::DragHost;
use tracing::debug;

use crate::registry::DropZoneId;
use crate::settings::DragTuning;

/// Scroll delta for a pointer near a container's edge, along the
/// container's primary axis.
///
/// Within `scroll_threshold_percent` of the near edge the delta is
/// negative (scroll back), within it of the far edge positive. The
/// magnitude scales linearly from `scroll_min_px` at the band's inner
/// boundary to `scroll_max_px` at the edge itself. Pointers outside the
/// band (or outside the container) produce no scroll.
pub fn scroll_delta(
    pointer: Position,
    container: &Rect,
    axis: Axis,
    tuning: &DragTuning,
) -> Option<f64> {
    let (pos, near, far, extent) = match axis {
        Axis::Horizontal => (pointer.x, container.x, container.right(), container.width),
        Axis::Vertical => (pointer.y, container.y, container.bottom(), container.height),
    };
    if extent <= 0.0 || pos < near || pos > far {
        return None;
    }

    let band = extent * tuning.scroll_threshold_percent;
    let span = tuning.scroll_max_px - tuning.scroll_min_px;

    let near_distance = pos - near;
    if near_distance < band {
        let proximity = 1.0 - near_distance / band;
        return Some(-(tuning.scroll_min_px + span * proximity));
    }

    let far_distance = far - pos;
    if far_distance < band {
        let proximity = 1.0 - far_distance / band;
        return Some(tuning.scroll_min_px + span * proximity);
    }

    None
}

/// Applies at most one scroll delta per animation tick.
///
/// Pointer moves between ticks overwrite the pending delta, so the last
/// observed position wins and scroll velocity stays bounded by the tick
/// rate.
#[derive(Debug, Default)]
pub struct AutoScroller {
    pending: Option<(ElementId, Position)>,
}

impl AutoScroller {
    /// Create an idle scroller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a scroll for the hovered container, replacing any pending one.
    pub fn plan(&mut self, container: ElementId, axis: Axis, delta: f64) {
        let offset = match axis {
            Axis::Horizontal => Position::new(delta, 0.0),
            Axis::Vertical => Position::new(0.0, delta),
        };
        self.pending = Some((container, offset));
    }

    /// Drop any pending scroll (drag ended or left the container).
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Apply the pending scroll, if any. Called once per animation tick.
    ///
    /// A detached container is a benign race; the pending scroll is simply
    /// discarded.
    pub fn apply_pending(&mut self, host: &mut impl DragHost) -> bool {
        let Some((container, delta)) = self.pending.take() else {
            return false;
        };
        match host.scroll_by(container, delta) {
            Ok(()) => true,
            Err(err) => {
                debug!("auto-scroll skipped: {}", err);
                false
            }
        }
    }
}

/// Remembers the last resolved insertion point so the gap animation only
/// re-runs when the predicted drop position moves.
#[derive(Debug, Default)]
pub struct SpacingTracker {
    current: Option<(DropZoneId, usize, Placement)>,
}

impl SpacingTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hover resolution. Returns `true` when the insertion point
    /// differs from the previous one and the host should re-space.
    pub fn observe(&mut self, zone: DropZoneId, result: &HoverResult) -> bool {
        let next = Some((zone, result.index, result.placement));
        if self.current == next {
            return false;
        }
        self.current = next;
        true
    }

    /// Forget the insertion point (hover left all zones or drag ended).
    /// Returns `true` if there was one to forget.
    pub fn reset(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// The current insertion point, if any.
    pub fn current(&self) -> Option<(DropZoneId, usize, Placement)> {
        self.current
    }
}

/// Open a gap of the dragged item's size at `index`, sliding trailing
/// sibling rectangles out of the way.
pub fn open_gap(rects: &[Rect], index: usize, item_size: Position) -> Vec<Rect> {
    grow_or_shrink_rect_in_list(rects, index, item_size)
}

/// Close a previously opened gap at `index`.
pub fn close_gap(rects: &[Rect], index: usize, item_size: Position) -> Vec<Rect> {
    grow_or_shrink_rect_in_list(rects, index, -item_size)
}
