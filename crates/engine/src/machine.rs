//! Interaction state machine.
//!
//! Consumes raw pointer events, advances the drag lifecycle, queries the
//! registry for the best hover target and fires the zone callbacks on
//! commit or cancel. All of it runs on the host's UI thread in event
//! order; the only suspension point is the animation tick the host drives
//! between frames.
//!
//! Failure is never surfaced to the caller: if the source element or the
//! drag clone disappears mid-drag (an async unmount racing the pointer),
//! the machine fails closed — the drag cancels, every zone callback fires
//! with `None`, and the phase returns to idle.

use dropkit_core::{ElementId, HoverResult, Item, Position};
use dropkit_host::DragHost;
use tracing::{debug, warn};

use crate::autoscroll::{scroll_delta, AutoScroller, SpacingTracker};
use crate::registry::{DropTargetRegistry, DropZoneId, ZoneRegistration};
use crate::session::{DragPhase, DragSession, PhaseObserver, SessionState};
use crate::settings::{DragDropSettings, SettingsError};

/// A raw pointer event, delivered by the host in event-loop order.
#[derive(Debug, Clone)]
pub enum PointerEvent {
    /// Pointer pressed on a draggable item inside a zone.
    Down {
        zone: DropZoneId,
        item: Item,
        element: ElementId,
        position: Position,
    },
    /// Pointer moved.
    Move { position: Position },
    /// Pointer released.
    Up { position: Position },
    /// Programmatic cancel (escape key).
    Cancel,
}

/// The zone and insertion point a drag currently targets.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSnapshot {
    pub zone: DropZoneId,
    pub result: HoverResult,
}

/// Snapshot handed back to the host after each event or tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineUpdate {
    /// Current drag phase.
    pub phase: DragPhase,
    /// Current hover target, if any.
    pub hover: Option<HoverSnapshot>,
    /// The predicted insertion point moved; re-run the gap animation.
    pub spacing_changed: bool,
}

/// Pointer-down bookkeeping before the drag threshold is crossed.
#[derive(Debug, Clone)]
struct PendingPickup {
    zone: DropZoneId,
    item: Item,
    element: ElementId,
    start: Position,
}

/// One independent drag surface.
///
/// Owns the registry, the single session record and the host boundary; an
/// application embeds one engine per surface and routes that surface's
/// pointer events through [`DragDropEngine::handle_event`].
pub struct DragDropEngine<H: DragHost> {
    settings: DragDropSettings,
    host: H,
    registry: DropTargetRegistry,
    state: SessionState,
    pending: Option<PendingPickup>,
    grab_offset: Position,
    last_hover: Option<(DropZoneId, HoverResult)>,
    scroller: AutoScroller,
    spacing: SpacingTracker,
    spacing_changed: bool,
    animation_left_ms: u64,
}

impl<H: DragHost> DragDropEngine<H> {
    /// Create an engine with validated settings.
    pub fn new(settings: DragDropSettings, host: H) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            host,
            registry: DropTargetRegistry::new(),
            state: SessionState::new(),
            pending: None,
            grab_offset: Position::default(),
            last_hover: None,
            scroller: AutoScroller::new(),
            spacing: SpacingTracker::new(),
            spacing_changed: false,
            animation_left_ms: 0,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &DragDropSettings {
        &self.settings
    }

    /// Replace the settings. Refused while a drag is live, since tuning is
    /// not allowed to change under an active session.
    pub fn update_settings(&mut self, settings: DragDropSettings) -> Result<(), SettingsError> {
        if self.state.phase() != DragPhase::Idle {
            return Err(SettingsError::DragInProgress);
        }
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Current drag phase.
    pub fn phase(&self) -> DragPhase {
        self.state.phase()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&DragSession> {
        self.state.session()
    }

    /// Register a phase observer.
    pub fn observe_phase(&mut self, observer: PhaseObserver) {
        self.state.observe(observer);
    }

    /// The host boundary.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host boundary, for layout changes between
    /// events.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &DropTargetRegistry {
        &self.registry
    }

    /// Register a drop zone.
    ///
    /// When the zone's container is measurable, its registered rectangle is
    /// taken live from the host with the container's padding stripped, so
    /// collision tests run against the content box rather than the border
    /// box. The supplied rect is the fallback for containers the host
    /// cannot measure yet.
    pub fn register_zone(&mut self, mut registration: ZoneRegistration) -> DropZoneId {
        if let Some(measured) = self.host.measure(registration.element) {
            registration.rect = measured.inset(self.host.padding(registration.element));
        }
        self.registry.register(registration)
    }

    /// Unregister a drop zone; safe to call mid-drag, the next hover
    /// resolution simply stops seeing it.
    pub fn unregister_zone(&mut self, id: DropZoneId) {
        self.registry.unregister(id);
    }

    /// Refresh a zone's bounding box after a layout change.
    pub fn update_zone_rect(&mut self, id: DropZoneId, rect: dropkit_core::Rect) {
        self.registry.update_rect(id, rect);
    }

    /// Re-measure a zone's container after a host resize notification.
    ///
    /// Honored only while `resize_listeners` is enabled; padding is
    /// stripped the same way registration strips it.
    pub fn refresh_zone_rect(&mut self, id: DropZoneId) {
        if !self.settings.container.resize_listeners {
            return;
        }
        let Some(element) = self.registry.get(id).map(|zone| zone.element) else {
            return;
        };
        if let Some(measured) = self.host.measure(element) {
            let rect = measured.inset(self.host.padding(element));
            self.registry.update_rect(id, rect);
        }
    }

    /// Enable or disable a zone.
    pub fn set_zone_disabled(&mut self, id: DropZoneId, disabled: bool) {
        self.registry.set_disabled(id, disabled);
    }

    /// Process one pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) -> EngineUpdate {
        self.spacing_changed = false;
        match event {
            PointerEvent::Down {
                zone,
                item,
                element,
                position,
            } => self.pointer_down(zone, item, element, position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Cancel => self.cancel(),
        }
        self.snapshot()
    }

    /// Advance one animation tick.
    ///
    /// Applies at most one pending auto-scroll while dragging, and counts
    /// the return/drop animation down to its finalization.
    pub fn tick(&mut self, delta_ms: u64) -> EngineUpdate {
        self.spacing_changed = false;
        match self.state.phase() {
            DragPhase::Dragging => {
                self.scroller.apply_pending(&mut self.host);
            }
            DragPhase::Returning | DragPhase::Dropping => {
                self.animation_left_ms = self.animation_left_ms.saturating_sub(delta_ms);
                if self.animation_left_ms == 0 {
                    self.finalize_animation();
                }
            }
            DragPhase::Idle | DragPhase::PickingUp => {}
        }
        self.snapshot()
    }

    fn snapshot(&self) -> EngineUpdate {
        EngineUpdate {
            phase: self.state.phase(),
            hover: self
                .last_hover
                .clone()
                .map(|(zone, result)| HoverSnapshot { zone, result }),
            spacing_changed: self.spacing_changed,
        }
    }

    fn pointer_down(
        &mut self,
        zone: DropZoneId,
        item: Item,
        element: ElementId,
        position: Position,
    ) {
        if self.state.phase() != DragPhase::Idle {
            debug!("ignoring pointer-down in phase {:?}", self.state.phase());
            return;
        }
        if self.host.measure(element).is_none() {
            debug!("ignoring pick-up of detached element {}", element);
            return;
        }
        self.pending = Some(PendingPickup {
            zone,
            item,
            element,
            start: position,
        });
        self.state.set_phase(DragPhase::PickingUp);
    }

    fn pointer_move(&mut self, position: Position) {
        match self.state.phase() {
            DragPhase::PickingUp => {
                let Some(pending) = &self.pending else {
                    return;
                };
                let movement = position - pending.start;
                if movement.length() > self.settings.tuning.drag_threshold_px {
                    self.begin_drag(position);
                }
            }
            DragPhase::Dragging => self.drag_move(position),
            DragPhase::Idle | DragPhase::Returning | DragPhase::Dropping => {}
        }
    }

    fn begin_drag(&mut self, position: Position) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let Some(source_rect) = self.host.measure(pending.element) else {
            warn!("source element {} detached during pick-up", pending.element);
            self.fail_closed();
            return;
        };
        let clone = match self.host.spawn_clone(pending.element) {
            Ok(clone) => clone,
            Err(err) => {
                warn!("failed to spawn drag clone: {}", err);
                self.fail_closed();
                return;
            }
        };

        self.grab_offset = pending.start - source_rect.origin();
        let key = self
            .registry
            .get(pending.zone)
            .and_then(|zone| zone.key.clone());
        debug!(
            "drag started for item {:?} from {}",
            pending.item.id, pending.zone
        );
        self.state.start_session(DragSession::new(
            key,
            pending.item,
            pending.zone,
            pending.element,
            source_rect,
            clone,
        ));
        self.state.set_phase(DragPhase::Dragging);

        // Resolve the initial hover at the position that crossed the
        // threshold.
        self.drag_move(position);
    }

    fn drag_move(&mut self, position: Position) {
        let Some((clone, item)) = self
            .state
            .session()
            .map(|session| (session.drag_element, session.item.clone()))
        else {
            return;
        };

        let target = position - self.grab_offset;
        if let Err(err) = self.host.move_clone(clone, target) {
            warn!("drag clone unavailable: {}", err);
            self.fail_closed();
            return;
        }

        let cached = match self.state.session_mut() {
            Some(session) => {
                session.invalidate_rect();
                session.cached_rect(&self.host)
            }
            None => None,
        };
        let Some(cached) = cached else {
            warn!("drag clone vanished between move and measure");
            self.fail_closed();
            return;
        };

        let prev_zone = self.last_hover.as_ref().map(|(zone, _)| *zone);
        let next = self.registry.resolve_hover(&cached, &item);
        let next_zone = next.as_ref().map(|(zone, _)| *zone);
        self.registry.notify_transition(prev_zone, next_zone);

        self.spacing_changed = match &next {
            Some((zone, result)) => {
                if self.settings.container.suppress_drop_spacing {
                    false
                } else {
                    self.spacing.observe(*zone, result)
                }
            }
            None => self.spacing.reset(),
        };
        self.last_hover = next;

        self.plan_autoscroll(position);
    }

    fn plan_autoscroll(&mut self, position: Position) {
        if self.settings.container.suppress_scroll {
            return;
        }
        let axis = self.settings.container.primary_axis;
        let hovered = self
            .last_hover
            .as_ref()
            .and_then(|(zone, _)| self.registry.get(*zone))
            .map(|zone| (zone.element, zone.rect));

        match hovered {
            Some((element, rect)) => {
                match scroll_delta(position, &rect, axis, &self.settings.tuning) {
                    Some(delta) => self.scroller.plan(element, axis, delta),
                    None => self.scroller.clear(),
                }
            }
            None => self.scroller.clear(),
        }
    }

    fn pointer_up(&mut self, _position: Position) {
        match self.state.phase() {
            DragPhase::Idle | DragPhase::Returning | DragPhase::Dropping => {
                // Stray release; nothing to do.
            }
            DragPhase::PickingUp => {
                // Never crossed the threshold: a click, not a drag.
                self.pending = None;
                self.state.set_phase(DragPhase::Idle);
            }
            DragPhase::Dragging => self.release_drag(),
        }
    }

    fn release_drag(&mut self) {
        let Some(item) = self.state.session().map(|session| session.item.clone()) else {
            self.fail_closed();
            return;
        };

        // Re-validate the hover at release time: the zone may have been
        // disabled, filled, or unregistered since the last resolution.
        let committed = match self.last_hover.take() {
            Some((zone, result)) if self.registry.accepts(zone, &item) => Some((zone, result)),
            _ => None,
        };

        self.scroller.clear();
        self.spacing_changed = self.spacing.reset();
        self.animation_left_ms = self.settings.tuning.animation_ms;

        match committed {
            Some((zone, result)) => {
                debug!(
                    "drop committed into {} at index {} ({:?})",
                    zone, result.index, result.placement
                );
                self.state.set_phase(DragPhase::Dropping);
                self.registry.broadcast_drop(Some(zone), Some(result));
            }
            None => {
                debug!("released over empty space; returning to source");
                self.state.set_phase(DragPhase::Returning);
            }
        }

        if self.animation_left_ms == 0 {
            self.finalize_animation();
        }
    }

    fn cancel(&mut self) {
        match self.state.phase() {
            DragPhase::PickingUp => {
                self.pending = None;
                self.state.set_phase(DragPhase::Idle);
            }
            DragPhase::Dragging => {
                debug!("drag cancelled");
                self.last_hover = None;
                self.scroller.clear();
                self.spacing_changed = self.spacing.reset();
                self.animation_left_ms = self.settings.tuning.animation_ms;
                self.state.set_phase(DragPhase::Returning);
                if self.animation_left_ms == 0 {
                    self.finalize_animation();
                }
            }
            DragPhase::Idle | DragPhase::Returning | DragPhase::Dropping => {}
        }
    }

    /// Tear down after the return/drop animation elapsed.
    fn finalize_animation(&mut self) {
        if self.state.phase() == DragPhase::Returning {
            // Cancelled drop: every zone hears it exactly once.
            self.registry.broadcast_drop(None, None);
        }
        if let Some(session) = self.state.take_session() {
            self.host.remove_clone(session.drag_element);
        }
        self.pending = None;
        self.last_hover = None;
        self.spacing.reset();
        self.scroller.clear();
        self.state.set_phase(DragPhase::Idle);
    }

    /// Abort the drag after a detached element, without surfacing an error.
    ///
    /// Zone callbacks still fire with `None` so dependent state does not
    /// desync from the engine.
    fn fail_closed(&mut self) {
        warn!("drag failed closed; cancelling");
        self.registry.broadcast_drop(None, None);
        if let Some(session) = self.state.take_session() {
            self.host.remove_clone(session.drag_element);
        }
        self.pending = None;
        self.last_hover = None;
        self.spacing.reset();
        self.scroller.clear();
        self.animation_left_ms = 0;
        self.state.set_phase(DragPhase::Idle);
    }
}
