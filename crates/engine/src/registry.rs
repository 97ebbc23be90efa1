//! Drop-target registry.
//!
//! Maintains the ordered set of registered drop zones and arbitrates
//! between candidate containers during hover resolution. Zone ids are
//! assigned from a monotonically increasing counter and never recycled, so
//! a reference kept across an async unmount reliably resolves to "not
//! found" instead of aliasing a newly registered zone.

use dropkit_core::{ElementId, HoverResult, Item, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Registry-assigned identifier of a drop zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DropZoneId(pub u64);

impl std::fmt::Display for DropZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

/// The capability set a drop zone exposes to the engine.
///
/// Concrete UI-bound zones and pure test doubles both satisfy this; the
/// state machine never needs a real visual tree behind it.
pub trait DropZoneHandle {
    /// The zone's best internal insertion point for the current drag,
    /// queried live on every hover resolution.
    ///
    /// An empty zone should answer with index `0`; `None` means the zone
    /// currently has no valid insertion point at all.
    fn resolve_hover(&self) -> Option<HoverResult>;

    /// Invoked exactly once per completed or cancelled drag. `Some` carries
    /// the commit; `None` is the cancel signal, after which the zone should
    /// close any gap it was showing.
    fn commit_drop(&mut self, result: Option<HoverResult>);

    /// The pointer crossed into this zone.
    fn enter_drop_zone(&mut self);

    /// The pointer crossed out of this zone.
    fn leave_drop_zone(&mut self);

    /// Membership predicate for capacity checks.
    fn has_item(&self, item_id: &str) -> bool;

    /// Number of items the zone currently holds.
    fn item_count(&self) -> usize;
}

/// A registered drop zone.
pub struct DropZone {
    /// Registry-assigned id, unique for the registry's lifetime.
    pub id: DropZoneId,
    /// Optional caller-supplied logical name for debugging and lookup.
    pub key: Option<String>,
    /// Maximum item count the zone accepts; `None` is unbounded.
    pub capacity: Option<usize>,
    /// Disabled zones are bypassed during hover resolution.
    pub disabled: bool,
    /// Current bounding box, refreshed on layout changes.
    pub rect: Rect,
    /// The zone's container element.
    pub element: ElementId,
    /// Zone callbacks.
    pub handle: Box<dyn DropZoneHandle>,
}

impl std::fmt::Debug for DropZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .field("disabled", &self.disabled)
            .field("rect", &self.rect)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// Parameters for registering a new drop zone.
pub struct ZoneRegistration {
    pub key: Option<String>,
    pub capacity: Option<usize>,
    pub disabled: bool,
    pub rect: Rect,
    pub element: ElementId,
    pub handle: Box<dyn DropZoneHandle>,
}

/// Ordered collection of registered drop zones.
#[derive(Default)]
pub struct DropTargetRegistry {
    zones: Vec<DropZone>,
    next_id: u64,
}

impl DropTargetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone, appending it in registration order.
    ///
    /// Negative capacity is unrepresentable: `capacity` is `Option<usize>`,
    /// so registration cannot fail.
    pub fn register(&mut self, registration: ZoneRegistration) -> DropZoneId {
        let id = DropZoneId(self.next_id);
        self.next_id += 1;
        debug!(
            "registered {} (key: {:?}, capacity: {:?})",
            id, registration.key, registration.capacity
        );
        self.zones.push(DropZone {
            id,
            key: registration.key,
            capacity: registration.capacity,
            disabled: registration.disabled,
            rect: registration.rect,
            element: registration.element,
            handle: registration.handle,
        });
        id
    }

    /// Remove a zone by id. No-op on unknown ids, since unmounts racing a
    /// drag are expected.
    pub fn unregister(&mut self, id: DropZoneId) {
        let before = self.zones.len();
        self.zones.retain(|zone| zone.id != id);
        if self.zones.len() != before {
            debug!("unregistered {}", id);
        }
    }

    /// Look up a zone by id.
    pub fn get(&self, id: DropZoneId) -> Option<&DropZone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    /// Look up a zone mutably by id.
    pub fn get_mut(&mut self, id: DropZoneId) -> Option<&mut DropZone> {
        self.zones.iter_mut().find(|zone| zone.id == id)
    }

    /// Look up a zone by its caller-supplied key.
    pub fn get_by_key(&self, key: &str) -> Option<&DropZone> {
        self.zones.iter().find(|zone| zone.key.as_deref() == Some(key))
    }

    /// Refresh a zone's bounding box after a layout change.
    pub fn update_rect(&mut self, id: DropZoneId, rect: Rect) {
        if let Some(zone) = self.get_mut(id) {
            zone.rect = rect;
        }
    }

    /// Enable or disable a zone.
    pub fn set_disabled(&mut self, id: DropZoneId, disabled: bool) {
        if let Some(zone) = self.get_mut(id) {
            zone.disabled = disabled;
        }
    }

    /// Number of registered zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Whether a zone would accept `item` right now: registered, enabled,
    /// and not at capacity (members are always accepted back).
    pub fn accepts(&self, id: DropZoneId, item: &Item) -> bool {
        match self.get(id) {
            Some(zone) => !zone.disabled && Self::within_capacity(zone, item),
            None => false,
        }
    }

    fn within_capacity(zone: &DropZone, item: &Item) -> bool {
        match zone.capacity {
            Some(capacity) => {
                zone.handle.item_count() < capacity || zone.handle.has_item(&item.id)
            }
            None => true,
        }
    }

    /// Resolve which zone and insertion point the dragged item currently
    /// targets.
    ///
    /// Scans non-disabled zones in registration order, skips zones the
    /// dragged rect does not overlap and zones at capacity that do not
    /// already contain the item, and keeps the zone with the strictly
    /// greatest overlap fraction (ties therefore go to the first-registered
    /// zone). The winner's own `resolve_hover` supplies the intra-zone
    /// answer. `None` means the drag is over empty space.
    pub fn resolve_hover(
        &self,
        dragged_rect: &Rect,
        dragged_item: &Item,
    ) -> Option<(DropZoneId, HoverResult)> {
        let mut best: Option<(&DropZone, f64)> = None;

        for zone in &self.zones {
            if zone.disabled {
                continue;
            }
            if !dragged_rect.overlaps(&zone.rect) {
                continue;
            }
            if !Self::within_capacity(zone, dragged_item) {
                continue;
            }

            let overlap = dragged_rect.percent_overlap(&zone.rect);
            let score = overlap.x * overlap.y;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((zone, score));
            }
        }

        let (zone, _) = best?;
        let result = zone.handle.resolve_hover()?;
        Some((zone.id, result))
    }

    /// Fire zone-boundary callbacks for a hover transition.
    ///
    /// `leave_drop_zone` fires on the previous zone, then `enter_drop_zone`
    /// on the new one, exactly once per crossing; resolving to the same
    /// zone twice in a row fires nothing. Unregistered ids are skipped.
    pub fn notify_transition(&mut self, prev: Option<DropZoneId>, next: Option<DropZoneId>) {
        if prev == next {
            return;
        }
        if let Some(id) = prev {
            if let Some(zone) = self.get_mut(id) {
                debug!("pointer left {}", id);
                zone.handle.leave_drop_zone();
            }
        }
        if let Some(id) = next {
            if let Some(zone) = self.get_mut(id) {
                debug!("pointer entered {}", id);
                zone.handle.enter_drop_zone();
            }
        }
    }

    /// Invoke every zone's drop callback exactly once for a finished drag.
    ///
    /// The resolved zone (if any) receives the hover result; every other
    /// zone receives `None` so it can discard any provisional state.
    pub fn broadcast_drop(&mut self, resolved: Option<DropZoneId>, result: Option<HoverResult>) {
        for zone in &mut self.zones {
            if Some(zone.id) == resolved {
                zone.handle.commit_drop(result.clone());
            } else {
                zone.handle.commit_drop(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropkit_core::Placement;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared log a stub zone writes its callback activity into.
    #[derive(Debug, Default)]
    pub struct ZoneLog {
        pub entered: u32,
        pub left: u32,
        pub drops: Vec<Option<HoverResult>>,
    }

    /// Test double for a zone: fixed item list, fixed hover answer.
    pub struct StubZone {
        pub items: Vec<Item>,
        pub hover: Option<HoverResult>,
        pub log: Rc<RefCell<ZoneLog>>,
    }

    impl StubZone {
        pub fn new(items: Vec<Item>, hover: Option<HoverResult>) -> (Self, Rc<RefCell<ZoneLog>>) {
            let log = Rc::new(RefCell::new(ZoneLog::default()));
            (
                Self {
                    items,
                    hover,
                    log: Rc::clone(&log),
                },
                log,
            )
        }
    }

    impl DropZoneHandle for StubZone {
        fn resolve_hover(&self) -> Option<HoverResult> {
            self.hover.clone()
        }

        fn commit_drop(&mut self, result: Option<HoverResult>) {
            self.log.borrow_mut().drops.push(result);
        }

        fn enter_drop_zone(&mut self) {
            self.log.borrow_mut().entered += 1;
        }

        fn leave_drop_zone(&mut self) {
            self.log.borrow_mut().left += 1;
        }

        fn has_item(&self, item_id: &str) -> bool {
            self.items.iter().any(|item| item.id == item_id)
        }

        fn item_count(&self) -> usize {
            self.items.len()
        }
    }

    fn hover_at(index: usize) -> HoverResult {
        HoverResult {
            index,
            item: Item::new(format!("sibling-{index}")),
            element: 900 + index as u64,
            placement: Placement::Before,
        }
    }

    fn register_stub(
        registry: &mut DropTargetRegistry,
        rect: Rect,
        items: Vec<Item>,
        capacity: Option<usize>,
        hover: Option<HoverResult>,
    ) -> (DropZoneId, Rc<RefCell<ZoneLog>>) {
        let (zone, log) = StubZone::new(items, hover);
        let id = registry.register(ZoneRegistration {
            key: None,
            capacity,
            disabled: false,
            rect,
            element: 0,
            handle: Box::new(zone),
        });
        (id, log)
    }

    #[test]
    fn test_ids_are_sequential_and_never_recycled() {
        let mut registry = DropTargetRegistry::new();
        let (a, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            vec![],
            None,
            None,
        );
        let (b, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            vec![],
            None,
            None,
        );
        assert_eq!(a, DropZoneId(0));
        assert_eq!(b, DropZoneId(1));

        registry.unregister(a);
        let (c, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            vec![],
            None,
            None,
        );
        assert_eq!(c, DropZoneId(2));
        assert!(registry.get(a).is_none());
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let mut registry = DropTargetRegistry::new();
        registry.unregister(DropZoneId(42));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_by_key() {
        let mut registry = DropTargetRegistry::new();
        let (zone, _) = StubZone::new(vec![], None);
        let id = registry.register(ZoneRegistration {
            key: Some("backlog".to_string()),
            capacity: None,
            disabled: false,
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            element: 7,
            handle: Box::new(zone),
        });

        assert_eq!(registry.get_by_key("backlog").map(|z| z.id), Some(id));
        assert!(registry.get_by_key("missing").is_none());
    }

    #[test]
    fn test_resolve_hover_picks_stacked_middle_zone() {
        // Three vertically stacked zones; the dragged rect is centered at
        // (50, 150), squarely inside the second.
        let mut registry = DropTargetRegistry::new();
        let (_top, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(0)),
        );
        let (middle, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 100.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(1)),
        );
        let (_bottom, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 200.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(2)),
        );

        let dragged = Rect::new(25.0, 125.0, 50.0, 50.0);
        let (zone, result) = registry
            .resolve_hover(&dragged, &Item::new("card"))
            .expect("hover");

        assert_eq!(zone, middle);
        assert_eq!(result.index, 1);
    }

    #[test]
    fn test_resolve_hover_over_empty_space() {
        let mut registry = DropTargetRegistry::new();
        register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(0)),
        );

        let dragged = Rect::new(500.0, 500.0, 50.0, 50.0);
        assert!(registry.resolve_hover(&dragged, &Item::new("card")).is_none());
    }

    #[test]
    fn test_resolve_hover_skips_disabled_zone() {
        let mut registry = DropTargetRegistry::new();
        let (id, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(0)),
        );
        registry.set_disabled(id, true);

        let dragged = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert!(registry.resolve_hover(&dragged, &Item::new("card")).is_none());
    }

    #[test]
    fn test_resolve_hover_respects_capacity() {
        // A full capacity-1 zone is skipped for a foreign item; the
        // next-best overlapping zone wins instead.
        let mut registry = DropTargetRegistry::new();
        let (_full, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![Item::new("resident")],
            Some(1),
            Some(hover_at(0)),
        );
        let (fallback, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 60.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(1)),
        );

        // Mostly inside the full zone, partially inside the fallback.
        let dragged = Rect::new(10.0, 10.0, 60.0, 60.0);
        let (zone, _) = registry
            .resolve_hover(&dragged, &Item::new("stranger"))
            .expect("hover");
        assert_eq!(zone, fallback);
    }

    #[test]
    fn test_resolve_hover_full_zone_accepts_own_member() {
        let mut registry = DropTargetRegistry::new();
        let (full, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![Item::new("resident")],
            Some(1),
            Some(hover_at(0)),
        );

        let dragged = Rect::new(10.0, 10.0, 50.0, 50.0);
        let (zone, _) = registry
            .resolve_hover(&dragged, &Item::new("resident"))
            .expect("hover");
        assert_eq!(zone, full);
    }

    #[test]
    fn test_resolve_hover_full_zone_rejects_stranger_with_no_fallback() {
        let mut registry = DropTargetRegistry::new();
        register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![Item::new("resident")],
            Some(1),
            Some(hover_at(0)),
        );

        let dragged = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert!(registry
            .resolve_hover(&dragged, &Item::new("stranger"))
            .is_none());
    }

    #[test]
    fn test_resolve_hover_tie_goes_to_first_registered() {
        // Two identical overlapping zones: the first registered must win.
        let mut registry = DropTargetRegistry::new();
        let (first, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(0)),
        );
        let (_second, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            Some(hover_at(1)),
        );

        let dragged = Rect::new(25.0, 25.0, 50.0, 50.0);
        let (zone, _) = registry
            .resolve_hover(&dragged, &Item::new("card"))
            .expect("hover");
        assert_eq!(zone, first);
    }

    #[test]
    fn test_notify_transition_fires_once_per_crossing() {
        let mut registry = DropTargetRegistry::new();
        let (a, log_a) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            None,
        );
        let (b, log_b) = register_stub(
            &mut registry,
            Rect::new(0.0, 100.0, 100.0, 100.0),
            vec![],
            None,
            None,
        );

        registry.notify_transition(None, Some(a));
        registry.notify_transition(Some(a), Some(a)); // no crossing
        registry.notify_transition(Some(a), Some(b));
        registry.notify_transition(Some(b), None);

        assert_eq!(log_a.borrow().entered, 1);
        assert_eq!(log_a.borrow().left, 1);
        assert_eq!(log_b.borrow().entered, 1);
        assert_eq!(log_b.borrow().left, 1);
    }

    #[test]
    fn test_notify_transition_skips_unregistered_zone() {
        let mut registry = DropTargetRegistry::new();
        let (a, log_a) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            None,
        );
        registry.unregister(a);

        // Stale ids on either side are silently skipped.
        registry.notify_transition(Some(a), None);
        registry.notify_transition(None, Some(a));
        assert_eq!(log_a.borrow().entered, 0);
        assert_eq!(log_a.borrow().left, 0);
    }

    #[test]
    fn test_broadcast_drop_reaches_every_zone_once() {
        let mut registry = DropTargetRegistry::new();
        let (a, log_a) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![],
            None,
            None,
        );
        let (_b, log_b) = register_stub(
            &mut registry,
            Rect::new(0.0, 100.0, 100.0, 100.0),
            vec![],
            None,
            None,
        );

        let result = hover_at(3);
        registry.broadcast_drop(Some(a), Some(result.clone()));

        assert_eq!(log_a.borrow().drops.as_slice(), &[Some(result)]);
        assert_eq!(log_b.borrow().drops.as_slice(), &[None]);
    }

    #[test]
    fn test_accepts_rechecks_capacity_and_disabled() {
        let mut registry = DropTargetRegistry::new();
        let (id, _) = register_stub(
            &mut registry,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![Item::new("resident")],
            Some(1),
            None,
        );

        assert!(registry.accepts(id, &Item::new("resident")));
        assert!(!registry.accepts(id, &Item::new("stranger")));

        registry.set_disabled(id, true);
        assert!(!registry.accepts(id, &Item::new("resident")));

        registry.unregister(id);
        assert!(!registry.accepts(id, &Item::new("resident")));
    }
}
