//! Input model: buttons, modifier keys, and the gesture state machine.
//!
//! This module defines the types consumed by the interaction engine.
//! `InputState` is the single source of truth for the active gesture
//! between pointer-down and pointer-up: one value, not a set of booleans,
//! so illegal combinations (resizing while drawing a region, say) cannot
//! be represented. Each variant carries the context needed to compute
//! incremental deltas and emit final mutations on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ResizeAnchor;
use crate::view::Point;
use crate::zone::{BoundingBox, BubbleOffset, ZoneId};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// A keyboard key, named as the host reports it (e.g. `"Delete"`,
/// `"Backspace"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected zone, if any. At most one zone is
    /// selected at a time.
    pub selected_id: Option<ZoneId>,
}

/// How a zone drag interprets pointer deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Translate all four corners uniformly.
    Move,
    /// Move the coordinates named by the anchor. The anchor is fixed at
    /// pointer-down and never re-evaluated mid-drag, so the active edge
    /// cannot switch as the box changes shape under the pointer.
    Resize(ResizeAnchor),
}

/// Optimistic geometry overlay held during an active drag.
///
/// The committed store value stays untouched while the pointer moves; the
/// renderer merges this overlay on top of it, and the engine commits it to
/// the store exactly once, on release. Owned exclusively by the engine and
/// read (never mutated) by the render path.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGeometry {
    pub id: ZoneId,
    /// In-progress bounding box, for move/resize drags.
    pub bbox: Option<BoundingBox>,
    /// In-progress bubble offset, for bubble drags. Unclamped; keeping the
    /// marker on-canvas is a render-time concern.
    pub bubble_offset: Option<BubbleOffset>,
}

/// Internal state for the pointer gesture machine.
///
/// Each active variant carries the gesture context needed to compute
/// per-event deltas and emit final actions on pointer-up.
#[derive(Debug, Clone)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// The user is dragging a zone's numbered bubble marker.
    DraggingBubble {
        /// Id of the zone whose bubble is being dragged.
        id: ZoneId,
        /// Image-space pointer position at the previous event.
        last_image: Point,
    },
    /// The user is moving or resizing an existing zone.
    DraggingZone {
        /// Id of the zone being dragged.
        id: ZoneId,
        /// Move or resize, decided once at pointer-down.
        mode: DragMode,
        /// Image-space pointer position at the previous event.
        last_image: Point,
    },
    /// The user is drawing a new region anchored at the down-point.
    DrawingRegion {
        /// Image-space corner where the drag started.
        anchor: Point,
        /// Image-space pointer position at the most recent event.
        current: Point,
    },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}
