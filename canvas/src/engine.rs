//! Interaction controller: the pointer-event state machine that mediates
//! between the geometry engine, the zone store, and the host.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the authoritative `ZoneStore`, the single-value input
//! state machine, and the optimistic drag overlay. Pointer handlers return
//! [`Action`] intents for the host to process (re-render, cursor changes,
//! recognition requests). Geometry edits touch only the overlay while the
//! pointer moves and are committed to the store exactly once, on release,
//! so high-frequency pointer events never cause store-mutation storms.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::consts::{BUBBLE_RADIUS, DOUBLE_CLICK_CLEARANCE_PX, MIN_ZONE_SIZE};
use crate::hit::{self, Hit, HitPart, ResizeAnchor};
use crate::input::{Button, DragMode, InputState, Key, Modifiers, PendingGeometry, UiState};
use crate::store::ZoneStore;
use crate::view::{Point, Viewport};
use crate::zone::{BoundingBox, BubbleOffset, PartialZone, Zone, ZoneId};

/// Intents returned from input handlers for the host to process.
#[derive(Debug, Clone)]
pub enum Action {
    /// The scene changed; redraw from the current engine state.
    RenderNeeded,
    /// Set the canvas cursor to the named CSS style.
    SetCursor(String),
    /// The selection changed (possibly to nothing).
    SelectionChanged(Option<ZoneId>),
    /// A committed edit to an existing zone.
    ZoneUpdated { id: ZoneId, fields: PartialZone },
    /// A zone was removed from the store.
    ZoneDeleted { id: ZoneId },
    /// Ask the recognition layer for a single-point lookup.
    RecognizePoint { x: f64, y: f64 },
    /// Ask the recognition layer to re-read a rectangle. `id` is `None`
    /// when the rectangle was drawn over empty space (create-from-region).
    RecognizeRect {
        id: Option<ZoneId>,
        bbox: BoundingBox,
        rotation: Option<f64>,
    },
    /// Ask the host to open its text editor for a zone.
    EditTextRequested { id: ZoneId },
}

/// Core engine state: store, viewport mapping, gesture machine, overlay.
pub struct EngineCore {
    pub store: ZoneStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    /// Optimistic drag overlay; `None` outside an active drag.
    pub overlay: Option<PendingGeometry>,
    busy: bool,
    cursor: &'static str,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            store: ZoneStore::new(),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::default(),
            overlay: None,
            busy: false,
            cursor: "crosshair",
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Viewport ---

    /// Update the canvas raster/CSS dimensions used for coordinate mapping.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let point = self.viewport.screen_to_image(screen);
        let mut actions = Vec::new();
        match hit::hit_scene(point, &self.store, &self.viewport) {
            Some(Hit { zone_id, part: HitPart::Bubble }) => {
                if let Some(zone) = self.store.get(&zone_id) {
                    // Seed the overlay from the rendered (clamped) position
                    // so the marker does not jump under the pointer.
                    let center =
                        hit::clamp_bubble(hit::bubble_center(zone), &zone.bbox, &self.viewport, BUBBLE_RADIUS);
                    let offset = BubbleOffset { dx: center.x - zone.bbox.x1, dy: center.y - zone.bbox.y1 };
                    self.overlay = Some(PendingGeometry { id: zone_id, bbox: None, bubble_offset: Some(offset) });
                    self.input = InputState::DraggingBubble { id: zone_id, last_image: point };
                    actions.push(Action::RenderNeeded);
                }
            }
            Some(Hit { zone_id, part }) => {
                if let Some(zone) = self.store.get(&zone_id) {
                    let bbox = zone.bbox;
                    let mode = match part {
                        HitPart::ResizeHandle(anchor) => DragMode::Resize(anchor),
                        _ => DragMode::Move,
                    };
                    if self.ui.selected_id != Some(zone_id) {
                        self.ui.selected_id = Some(zone_id);
                        actions.push(Action::SelectionChanged(Some(zone_id)));
                    }
                    self.overlay = Some(PendingGeometry { id: zone_id, bbox: Some(bbox), bubble_offset: None });
                    self.input = InputState::DraggingZone { id: zone_id, mode, last_image: point };
                    let cursor = match mode {
                        DragMode::Resize(anchor) => hit::cursor_for_anchor(Some(anchor)),
                        DragMode::Move => hit::cursor_for_anchor(None),
                    };
                    actions.extend(self.set_cursor(cursor));
                    actions.push(Action::RenderNeeded);
                }
            }
            None => {
                if self.ui.selected_id.is_some() {
                    self.ui.selected_id = None;
                    actions.push(Action::SelectionChanged(None));
                }
                self.input = InputState::DrawingRegion { anchor: point, current: point };
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        let point = self.viewport.screen_to_image(screen);
        match self.input.clone() {
            InputState::Idle => self.hover_feedback(point),
            InputState::DraggingBubble { id, last_image } => {
                let dx = point.x - last_image.x;
                let dy = point.y - last_image.y;
                if let Some(overlay) = self.overlay.as_mut() {
                    if let Some(offset) = overlay.bubble_offset.as_mut() {
                        offset.dx += dx;
                        offset.dy += dy;
                    }
                }
                self.input = InputState::DraggingBubble { id, last_image: point };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingZone { id, mode, last_image } => {
                let dx = point.x - last_image.x;
                let dy = point.y - last_image.y;
                if let Some(overlay) = self.overlay.as_mut() {
                    if let Some(bbox) = overlay.bbox {
                        overlay.bbox = Some(match mode {
                            DragMode::Move => bbox.translated(dx, dy),
                            DragMode::Resize(anchor) => apply_resize(&bbox, anchor, dx, dy),
                        });
                    }
                }
                self.input = InputState::DraggingZone { id, mode, last_image: point };
                vec![Action::RenderNeeded]
            }
            InputState::DrawingRegion { anchor, .. } => {
                self.input = InputState::DrawingRegion { anchor, current: point };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        // Fold the final position into the gesture before committing.
        let mut actions = self.on_pointer_move(screen, modifiers);
        actions.extend(self.finish_gesture());
        actions
    }

    /// Treated exactly like a pointer-up at the last known position: a drag
    /// must never stay stuck when the pointer leaves the canvas.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.finish_gesture()
    }

    /// A double-click on a zone opens its text editor; on empty space with
    /// clearance from every zone it is a fast single-point lookup that
    /// bypasses the rectangle-draw flow.
    pub fn on_double_click(&mut self, screen: Point) -> Vec<Action> {
        let point = self.viewport.screen_to_image(screen);
        if let Some(zone) = hit::find_top_zone_at(point, &self.store) {
            return vec![Action::EditTextRequested { id: zone.id }];
        }
        let clear_of_zones = self
            .store
            .zones()
            .iter()
            .all(|zone| !zone.bbox.expanded(DOUBLE_CLICK_CLEARANCE_PX).contains(point));
        if clear_of_zones && !self.busy {
            vec![Action::RecognizePoint { x: point.x, y: point.y }]
        } else {
            Vec::new()
        }
    }

    /// Delete/Backspace removes the selected zone. The host is responsible
    /// for not forwarding key events while a text control has focus.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.0 != "Delete" && key.0 != "Backspace" {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        self.delete_zone(&id)
    }

    // --- Gesture completion ---

    fn finish_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let overlay = self.overlay.take();
        let mut actions = Vec::new();
        match state {
            InputState::Idle => {}
            InputState::DraggingBubble { id, .. } => {
                if let Some(offset) = overlay.and_then(|o| o.bubble_offset) {
                    let fields = PartialZone::with_bubble_offset(offset);
                    if self.store.apply_partial(&id, &fields) {
                        actions.push(Action::ZoneUpdated { id, fields });
                    }
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DraggingZone { id, mode, .. } => {
                if let Some(bbox) = overlay.and_then(|o| o.bbox) {
                    let fields = PartialZone::with_bbox(bbox);
                    if self.store.apply_partial(&id, &fields) {
                        actions.push(Action::ZoneUpdated { id, fields });
                        // A resized crop needs re-reading; translation alone
                        // leaves the text content untouched.
                        if matches!(mode, DragMode::Resize(_)) && !self.busy {
                            let rotation = self
                                .store
                                .get(&id)
                                .map(|zone| zone.rotation)
                                .filter(|rotation| rotation.abs() > f64::EPSILON);
                            actions.push(Action::RecognizeRect { id: Some(id), bbox: bbox.normalized(), rotation });
                        }
                    }
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DrawingRegion { anchor, current } => {
                let bbox = BoundingBox::from_corners(anchor.x, anchor.y, current.x, current.y);
                if bbox.width > MIN_ZONE_SIZE && bbox.height > MIN_ZONE_SIZE && !self.busy {
                    actions.push(Action::RecognizeRect { id: None, bbox, rotation: None });
                }
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    // --- Hover feedback ---

    fn hover_feedback(&mut self, point: Point) -> Vec<Action> {
        let cursor = match hit::hit_scene(point, &self.store, &self.viewport) {
            Some(Hit { part: HitPart::Bubble, .. }) => "grab",
            Some(Hit { part: HitPart::ResizeHandle(anchor), .. }) => hit::cursor_for_anchor(Some(anchor)),
            Some(Hit { part: HitPart::Body, .. }) => hit::cursor_for_anchor(None),
            None => "crosshair",
        };
        self.set_cursor(cursor).into_iter().collect()
    }

    fn set_cursor(&mut self, cursor: &'static str) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor = cursor;
        Some(Action::SetCursor(cursor.to_string()))
    }

    // --- Direct intents ---

    /// Select a zone (or clear the selection with `None`).
    pub fn select_zone(&mut self, id: Option<ZoneId>) -> Vec<Action> {
        let id = id.filter(|id| self.store.contains(id));
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        vec![Action::SelectionChanged(id), Action::RenderNeeded]
    }

    /// Remove a zone, clearing the selection when it was selected.
    pub fn delete_zone(&mut self, id: &ZoneId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.store.remove(id).is_some() {
            if self.ui.selected_id.as_ref() == Some(id) {
                self.ui.selected_id = None;
                actions.push(Action::SelectionChanged(None));
            }
            actions.push(Action::ZoneDeleted { id: *id });
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Restore the most recently deleted snapshot of `id`, if one is held.
    pub fn undo_delete(&mut self, id: &ZoneId) -> Vec<Action> {
        if self.store.undo_restore(id) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Empty the store. The confirmation prompt is the host's concern.
    pub fn clear_all(&mut self) -> Vec<Action> {
        self.store.clear();
        self.ui.selected_id = None;
        self.input = InputState::Idle;
        self.overlay = None;
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Commit text from the host editor; re-derives the tolerance
    /// annotation from the new text.
    pub fn set_text(&mut self, id: &ZoneId, text: &str) -> Vec<Action> {
        if self.store.set_text(id, text) {
            let fields = PartialZone {
                text: Some(text.to_string()),
                tolerance: self.store.get(id).and_then(|zone| zone.tolerance),
                ..PartialZone::default()
            };
            vec![Action::ZoneUpdated { id: *id, fields }, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Recognition-layer inputs ---

    /// Bulk-populate from whole-image detection results.
    pub fn apply_detections(&mut self, zones: Vec<Zone>) {
        for zone in zones {
            self.store.insert(zone);
        }
    }

    /// Append a single zone created by a point or rectangle query. It
    /// becomes topmost and highest-numbered.
    pub fn apply_zone_created(&mut self, zone: Zone) {
        self.store.insert(zone);
    }

    /// Merge recognition results into an existing zone. A stale target
    /// (deleted while the request was in flight) is a silent no-op.
    pub fn apply_update(&mut self, id: &ZoneId, fields: &PartialZone) -> bool {
        self.store.apply_partial(id, fields)
    }

    /// Whether a recognition request is in flight. While busy, the engine
    /// suppresses new pointer-initiated queries.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    // --- Render surface ---

    /// The currently selected zone, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ZoneId> {
        self.ui.selected_id
    }

    /// Look up a zone by id (committed state, without the drag overlay).
    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.store.get(id)
    }

    /// A zone as it should be drawn right now: committed state with the
    /// optimistic drag overlay merged on top.
    #[must_use]
    pub fn zone_view(&self, id: &ZoneId) -> Option<Zone> {
        let zone = self.store.get(id)?.clone();
        Some(self.merge_overlay(zone))
    }

    /// All zones in draw order with the drag overlay merged.
    #[must_use]
    pub fn render_zones(&self) -> Vec<Zone> {
        self.store
            .zones()
            .iter()
            .map(|zone| self.merge_overlay(zone.clone()))
            .collect()
    }

    /// Where a zone's bubble should be drawn, clamped to stay on-canvas.
    #[must_use]
    pub fn bubble_center(&self, zone: &Zone) -> Point {
        hit::clamp_bubble(hit::bubble_center(zone), &zone.bbox, &self.viewport, BUBBLE_RADIUS)
    }

    /// The in-progress region rectangle, for marquee rendering.
    #[must_use]
    pub fn drawing_region(&self) -> Option<BoundingBox> {
        match &self.input {
            InputState::DrawingRegion { anchor, current } => {
                Some(BoundingBox::from_corners(anchor.x, anchor.y, current.x, current.y))
            }
            _ => None,
        }
    }

    fn merge_overlay(&self, mut zone: Zone) -> Zone {
        if let Some(overlay) = &self.overlay {
            if overlay.id == zone.id {
                if let Some(bbox) = overlay.bbox {
                    zone.bbox = bbox.normalized();
                }
                if let Some(offset) = overlay.bubble_offset {
                    zone.bubble_offset = Some(offset);
                }
            }
        }
        zone
    }
}

/// Apply a resize delta to the edges named by the anchor. The minimum size
/// clamps the moving edge; the fixed corner never shifts.
fn apply_resize(bbox: &BoundingBox, anchor: ResizeAnchor, dx: f64, dy: f64) -> BoundingBox {
    let mut x1 = bbox.x1;
    let mut y1 = bbox.y1;
    let mut x2 = bbox.x2;
    let mut y2 = bbox.y2;
    if anchor.moves_west() {
        x1 = (x1 + dx).min(x2 - MIN_ZONE_SIZE);
    }
    if anchor.moves_east() {
        x2 = (x2 + dx).max(x1 + MIN_ZONE_SIZE);
    }
    if anchor.moves_north() {
        y1 = (y1 + dy).min(y2 - MIN_ZONE_SIZE);
    }
    if anchor.moves_south() {
        y2 = (y2 + dy).max(y1 + MIN_ZONE_SIZE);
    }
    BoundingBox::from_corners(x1, y1, x2, y2)
}
