//! Pointer-driven drag-and-drop engine.
//!
//! The engine is framework-agnostic: it never touches a widget tree
//! directly. A host implements [`dropkit_host::DragHost`] to measure
//! elements, float a drag clone and scroll containers; the engine drives
//! the lifecycle (pick-up threshold, hover arbitration across registered
//! drop zones, auto-scroll, commit or cancel) and reports back through
//! zone callbacks and [`EngineUpdate`] snapshots.
//!
//! Typical embedding:
//!
//! ```
//! use dropkit_engine::{DragDropEngine, DragDropSettings, PointerEvent};
//! use dropkit_host::HeadlessHost;
//!
//! let host = HeadlessHost::new();
//! let mut engine = DragDropEngine::new(DragDropSettings::default(), host)?;
//! // register zones, then feed pointer events:
//! engine.handle_event(PointerEvent::Cancel);
//! # Ok::<(), dropkit_engine::SettingsError>(())
//! ```

pub mod autoscroll;
pub mod machine;
pub mod registry;
pub mod session;
pub mod settings;

pub use autoscroll::{close_gap, open_gap, scroll_delta, AutoScroller, SpacingTracker};
pub use machine::{DragDropEngine, EngineUpdate, HoverSnapshot, PointerEvent};
pub use registry::{DropTargetRegistry, DropZone, DropZoneHandle, DropZoneId, ZoneRegistration};
pub use session::{DragPhase, DragSession, PhaseObserver, SessionState};
pub use settings::{ContainerDefaults, DragDropSettings, DragTuning, SettingsError};
