//! Drag session state.
//!
//! A single process-wide (per engine) record of the item currently being
//! manipulated, plus the phase of the drag lifecycle. Phase changes are
//! pushed to registered observers so hosts can react without polling;
//! this replaces the reactive-store subscriptions of framework-bound
//! implementations with plain callbacks.

use dropkit_core::{ElementId, Item, Rect};
use dropkit_host::MeasurementProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::DropZoneId;

/// Lifecycle phase of the drag interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DragPhase {
    /// No drag in progress.
    #[default]
    Idle,
    /// Pointer is down but movement has not exceeded the drag threshold.
    PickingUp,
    /// The clone is tracking the pointer.
    Dragging,
    /// The clone is animating back to its source (cancelled drop).
    Returning,
    /// The drop committed; the finalizing animation is running.
    Dropping,
}

/// The active drag: source geometry, the floating clone, and the zone the
/// item logically belongs to.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Optional logical name carried over from the originating zone.
    pub key: Option<String>,
    /// The item being dragged.
    pub item: Item,
    /// The zone the item currently logically belongs to.
    pub controlling_zone: DropZoneId,
    /// The original element the drag started from.
    pub source_element: ElementId,
    /// Bounding box of the source element at pick-up time.
    pub source_rect: Rect,
    /// The floating clone tracking the pointer.
    pub drag_element: ElementId,
    cached_rect: Rect,
    cache_dirty: bool,
}

impl DragSession {
    /// Create a session at pick-up time. The cached rect starts as the
    /// source rect, which is where the clone spawns.
    pub fn new(
        key: Option<String>,
        item: Item,
        controlling_zone: DropZoneId,
        source_element: ElementId,
        source_rect: Rect,
        drag_element: ElementId,
    ) -> Self {
        Self {
            key,
            item,
            controlling_zone,
            source_element,
            source_rect,
            drag_element,
            cached_rect: source_rect,
            cache_dirty: false,
        }
    }

    /// Mark the cached rect stale after the clone moved.
    pub fn invalidate_rect(&mut self) {
        self.cache_dirty = true;
    }

    /// The clone's rectangle for collision tests.
    ///
    /// Re-measured only when invalidated by movement, so geometry tests
    /// between pointer-move events stay cheap. `None` means the clone has
    /// detached from the visual tree.
    pub fn cached_rect(&mut self, host: &impl MeasurementProvider) -> Option<Rect> {
        if self.cache_dirty {
            self.cached_rect = host.measure(self.drag_element)?;
            self.cache_dirty = false;
        }
        Some(self.cached_rect)
    }
}

/// Observer invoked with `(previous, next)` on every phase change.
pub type PhaseObserver = Box<dyn FnMut(DragPhase, DragPhase)>;

/// Phase + session storage with change notification.
#[derive(Default)]
pub struct SessionState {
    phase: DragPhase,
    session: Option<DragSession>,
    observers: Vec<PhaseObserver>,
}

impl SessionState {
    /// Create idle state with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Advance the phase, notifying observers only on actual change.
    pub fn set_phase(&mut self, next: DragPhase) {
        if self.phase == next {
            return;
        }
        let prev = self.phase;
        self.phase = next;
        debug!("drag phase {:?} -> {:?}", prev, next);
        for observer in &mut self.observers {
            observer(prev, next);
        }
    }

    /// Register a phase observer.
    pub fn observe(&mut self, observer: PhaseObserver) {
        self.observers.push(observer);
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// The active session mutably, if any.
    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        self.session.as_mut()
    }

    /// Install the session created at pick-up.
    pub fn start_session(&mut self, session: DragSession) {
        debug_assert!(self.session.is_none(), "a drag session is already live");
        self.session = Some(session);
    }

    /// Remove and return the session when the drag finishes.
    pub fn take_session(&mut self) -> Option<DragSession> {
        self.session.take()
    }
}
