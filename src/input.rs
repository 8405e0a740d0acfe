//! Input model: modifier keys, mouse buttons, keys, and the gesture state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. Each active variant carries the context needed to compute
//! incremental deltas and to commit (or abort) on release. Gesture state is
//! transient: it is never journaled and is reset whenever history is restored.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::provider::ResizeHandle;
use crate::shape::{Anchor, EdgeEnd, ShapeData, ShapeId};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Any key that turns a click into a selection toggle.
    #[must_use]
    pub fn toggles_selection(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Gesture in progress. Exactly one at a time.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving the selected shapes.
    DraggingShapes {
        /// Canvas position at the previous event.
        last_world: Point,
        /// Whether any move was applied.
        moved: bool,
        /// A click on a member of a multi-selection collapses to this shape on
        /// release, unless the click turned into a drag.
        collapse_to: Option<ShapeId>,
    },
    /// Dragging one resize handle.
    Resizing {
        id: ShapeId,
        handle: ResizeHandle,
        start_world: Point,
        /// Shape data at pointer-down; each move resizes from this.
        original: Box<ShapeData>,
        moved: bool,
    },
    /// Dragging a rounded rectangle's corner handle.
    DraggingCornerRadius {
        id: ShapeId,
        start_world: Point,
        start_radius: f64,
        moved: bool,
    },
    /// Dragging a free edge's endpoint toward a bind target.
    DraggingConnectorEndpoint {
        id: ShapeId,
        end: EdgeEnd,
        /// Endpoint position at pointer-down; restored on abort.
        original: Point,
    },
    /// Dragging a polyline point or connector waypoint.
    DraggingPolylinePoint {
        id: ShapeId,
        index: usize,
        start_world: Point,
        original: Point,
        moved: bool,
    },
    /// Drawing a new edge out of a port; a preview edge follows the pointer.
    Connecting {
        from: Anchor,
        origin: Point,
        current: Point,
    },
    /// Rubber-band selection.
    BoxSelecting {
        origin: Point,
        current: Point,
        /// Add to the existing selection instead of replacing it.
        additive: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingShapes { .. } => "draggingShapes",
            Self::Resizing { .. } => "resizing",
            Self::DraggingCornerRadius { .. } => "draggingCornerRadius",
            Self::DraggingConnectorEndpoint { .. } => "draggingConnectorEndpoint",
            Self::DraggingPolylinePoint { .. } => "draggingPolylinePoint",
            Self::Connecting { .. } => "connecting",
            Self::BoxSelecting { .. } => "boxSelecting",
        }
    }
}
