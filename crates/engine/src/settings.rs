//! Static configuration for the drag-and-drop engine.
//!
//! Settings are supplied once at engine construction, typically from an
//! embedded TOML snippet; every field is optional and falls back to the
//! stated default. They are read-only for the lifetime of a drag: the
//! engine refuses settings updates while a session is live.

use dropkit_core::Axis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error("Settings cannot change while a drag is in progress")]
    DragInProgress,
}

/// Top-level engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragDropSettings {
    /// Per-container defaults.
    pub container: ContainerDefaults,
    /// Numeric tuning for thresholds, animation and auto-scroll.
    pub tuning: DragTuning,
}

/// Default behavior applied to every registered container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerDefaults {
    /// Disable auto-scroll for containers.
    #[serde(default = "default_false")]
    pub suppress_scroll: bool,

    /// Disable the drop-spacing gap animation.
    #[serde(default = "default_false")]
    pub suppress_drop_spacing: bool,

    /// Re-measure container rectangles on host resize notifications.
    #[serde(default = "default_true")]
    pub resize_listeners: bool,

    /// Primary flow axis of container item lists.
    #[serde(default)]
    pub primary_axis: Axis,
}

impl Default for ContainerDefaults {
    fn default() -> Self {
        Self {
            suppress_scroll: default_false(),
            suppress_drop_spacing: default_false(),
            resize_listeners: default_true(),
            primary_axis: Axis::default(),
        }
    }
}

/// Numeric tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragTuning {
    /// Cumulative pointer movement (pixels) before a press becomes a drag.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold_px: f64,

    /// Duration of the return/drop animation in milliseconds.
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,

    /// Edge band that triggers auto-scroll, as a fraction of the
    /// container's extent along the scroll axis.
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_percent: f64,

    /// Scroll speed floor in pixels per animation tick.
    #[serde(default = "default_scroll_min")]
    pub scroll_min_px: f64,

    /// Scroll speed ceiling in pixels per animation tick.
    #[serde(default = "default_scroll_max")]
    pub scroll_max_px: f64,
}

impl Default for DragTuning {
    fn default() -> Self {
        Self {
            drag_threshold_px: default_drag_threshold(),
            animation_ms: default_animation_ms(),
            scroll_threshold_percent: default_scroll_threshold(),
            scroll_min_px: default_scroll_min(),
            scroll_max_px: default_scroll_max(),
        }
    }
}

fn default_drag_threshold() -> f64 {
    25.0
}

fn default_animation_ms() -> u64 {
    200
}

fn default_scroll_threshold() -> f64 {
    0.15
}

fn default_scroll_min() -> f64 {
    2.0
}

fn default_scroll_max() -> f64 {
    24.0
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl DragDropSettings {
    /// Parse settings from a TOML string and validate them.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: DragDropSettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject tuning values that would make the engine misbehave.
    ///
    /// Invalid settings are a programmer error caught at construction, not
    /// something to limp along with mid-drag.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let tuning = &self.tuning;
        if tuning.drag_threshold_px < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "drag_threshold_px must be non-negative, got {}",
                tuning.drag_threshold_px
            )));
        }
        if tuning.scroll_min_px < 0.0 || tuning.scroll_max_px < 0.0 {
            return Err(SettingsError::Invalid(
                "scroll speed bounds must be non-negative".to_string(),
            ));
        }
        if tuning.scroll_min_px > tuning.scroll_max_px {
            return Err(SettingsError::Invalid(format!(
                "scroll_min_px ({}) exceeds scroll_max_px ({})",
                tuning.scroll_min_px, tuning.scroll_max_px
            )));
        }
        // Above half the container the near and far bands would overlap.
        if tuning.scroll_threshold_percent <= 0.0 || tuning.scroll_threshold_percent > 0.5 {
            return Err(SettingsError::Invalid(format!(
                "scroll_threshold_percent must be in (0, 0.5], got {}",
                tuning.scroll_threshold_percent
            )));
        }
        Ok(())
    }
}
