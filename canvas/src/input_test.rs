use uuid::Uuid;

use super::*;
use crate::hit::ResizeAnchor;
use crate::view::Point;
use crate::zone::BoundingBox;

// =============================================================
// Button / Modifiers / Key
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn button_equality() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Secondary);
}

#[test]
fn key_wraps_host_name() {
    let key = Key("Delete".into());
    assert_eq!(key.0, "Delete");
    assert_eq!(key, Key("Delete".into()));
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_default_has_no_selection() {
    assert!(UiState::default().selected_id.is_none());
}

// =============================================================
// DragMode
// =============================================================

#[test]
fn drag_mode_carries_anchor() {
    let mode = DragMode::Resize(ResizeAnchor::Se);
    assert_eq!(mode, DragMode::Resize(ResizeAnchor::Se));
    assert_ne!(mode, DragMode::Move);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}

#[test]
fn dragging_zone_carries_context() {
    let id = Uuid::new_v4();
    let state = InputState::DraggingZone {
        id,
        mode: DragMode::Move,
        last_image: Point::new(5.0, 6.0),
    };
    if let InputState::DraggingZone { id: got, mode, last_image } = state {
        assert_eq!(got, id);
        assert_eq!(mode, DragMode::Move);
        assert_eq!(last_image, Point::new(5.0, 6.0));
    } else {
        unreachable!("constructed variant must match");
    }
}

// =============================================================
// PendingGeometry
// =============================================================

#[test]
fn pending_geometry_tracks_one_zone() {
    let id = Uuid::new_v4();
    let pending = PendingGeometry {
        id,
        bbox: Some(BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0)),
        bubble_offset: None,
    };
    assert_eq!(pending.id, id);
    assert!(pending.bbox.is_some());
    assert!(pending.bubble_offset.is_none());
}
