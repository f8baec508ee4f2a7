//! Input model: pointer targets, the gesture state machine, and the pointer source seam.
//!
//! `PointerTarget` captures what the pointer landed on at pointer-down.
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up, carrying the anchor and staged values needed to compute
//! incremental deltas and the final commit on release. `PointerSource` stands
//! in for the host's global move/up listeners so the state machine runs
//! without a UI runtime.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geometry::{ItemId, Point};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty board area.
    Canvas,
    /// An item's body, anywhere outside its controls.
    Body(ItemId),
    /// The bottom-right resize hotspot of an item.
    ResizeHandle(ItemId),
    /// A control inside an item's content (media transport, etc.). Never starts a gesture.
    Control(ItemId),
}

/// When gesture results are written to the item record.
///
/// Applies uniformly to drag and resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Stage position/size during the gesture; write once on pointer-up.
    #[default]
    OnRelease,
    /// Write every pointer-move increment as it arrives.
    Continuous,
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// The host's global pointer-move/pointer-up listeners.
///
/// The engine subscribes when a gesture starts and unsubscribes as soon as it
/// returns to idle, so at most one subscription is ever live.
pub trait PointerSource {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
}

/// A pointer source with no host behind it. Used until the host installs one.
#[derive(Debug, Default)]
pub struct DetachedSource;

impl PointerSource for DetachedSource {
    fn subscribe(&mut self) {}
    fn unsubscribe(&mut self) {}
}

/// The gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging on empty canvas to move the viewport.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving an item.
    Dragging {
        id: ItemId,
        /// Screen position of the previous pointer event; reset on every move.
        anchor: Point,
        /// Item position at pointer-down, for detecting a no-op release.
        origin: Point,
        /// Candidate top-left position in canvas units.
        staged: Point,
    },
    /// Resizing an item from its bottom-right corner.
    Resizing {
        id: ItemId,
        /// Screen position of the previous pointer event; reset on every move.
        anchor: Point,
        /// Item size at pointer-down.
        orig_width: f64,
        orig_height: f64,
        /// Candidate size in canvas units, never below the minimum.
        staged_width: f64,
        staged_height: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The item the gesture is acting on, if any.
    #[must_use]
    pub fn active_item(&self) -> Option<ItemId> {
        match self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
            Self::Idle | Self::Panning { .. } => None,
        }
    }
}
