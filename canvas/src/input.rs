//! Input model: mouse buttons, keys, display flags, and the interaction state machine states.
//!
//! `InteractionState` is the active gesture or mode being tracked between
//! events, carrying the context needed to compute positions on move and to
//! decide what to persist on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::camera::Point;
use crate::doc::NodeId;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click). Always pans.
    Middle,
    /// Right mouse button. Ignored by the canvas.
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// The node whose detail view is open, if any.
    pub selected: Option<NodeId>,
    /// Background grid visibility. No geometric effect.
    pub show_grid: bool,
    /// Minimap visibility. No geometric effect.
    pub show_minimap: bool,
}

/// Coarse interaction mode reported to the host (toolbar highlighting, cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Idle,
    Panning,
    Dragging,
    ConnectingSource,
    ConnectingTarget,
}

/// Internal state for the interaction state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Panning {
        /// `pointer - pan` at pointer-down; pan follows as `pointer - pan_start`.
        pan_start: Point,
    },
    /// The user is moving a node across the canvas.
    DraggingNode {
        /// Id of the node being dragged.
        id: NodeId,
        /// Pointer minus the node's screen-space origin at pointer-down.
        grab_offset: Point,
        /// Screen position of the pointer-down, used to tell drags from clicks.
        press_screen: Point,
        /// Set once the pointer has travelled beyond the click slop.
        moved: bool,
    },
    /// Connect mode is on and the next clicked node becomes the source.
    ConnectingAwaitingSource,
    /// Connect mode has a source; the next other node clicked becomes the target.
    ConnectingAwaitingTarget {
        /// The node the new connection will start from.
        source: NodeId,
    },
}

impl InteractionState {
    /// Whether connect mode is engaged.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::ConnectingAwaitingSource | Self::ConnectingAwaitingTarget { .. })
    }

    /// The coarse mode for this state.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::Panning { .. } => Mode::Panning,
            Self::DraggingNode { .. } => Mode::Dragging,
            Self::ConnectingAwaitingSource => Mode::ConnectingSource,
            Self::ConnectingAwaitingTarget { .. } => Mode::ConnectingTarget,
        }
    }
}
