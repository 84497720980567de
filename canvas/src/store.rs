//! Zone store: the ordered, authoritative collection of zones.
//!
//! Insertion order is significant: it defines the display numbering
//! ("#1, #2, ...") and the z-order used for hit-testing, with the
//! last-inserted zone topmost. Display numbers are always derived from
//! position, never stored, so deleting a zone renumbers the rest
//! implicitly. Removed zones are snapshotted onto a small ring for
//! one-step restoration.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::VecDeque;

use crate::tolerance::parse_tolerance;
use crate::zone::{PartialZone, Zone, ZoneId};

/// Number of deleted-zone snapshots retained for undo.
const UNDO_CAPACITY: usize = 8;

/// A pre-delete snapshot: the zone and its position at removal time.
#[derive(Debug, Clone)]
struct Removed {
    zone: Zone,
    index: usize,
}

/// In-memory store of zones, ordered by insertion.
pub struct ZoneStore {
    zones: Vec<Zone>,
    removed: VecDeque<Removed>,
}

impl ZoneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { zones: Vec::new(), removed: VecDeque::new() }
    }

    /// Append a zone; it becomes topmost and highest-numbered.
    pub fn insert(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// Return a reference to a zone by id.
    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ZoneId) -> bool {
        self.get(id).is_some()
    }

    /// Insertion position of a zone, if present.
    #[must_use]
    pub fn index_of(&self, id: &ZoneId) -> Option<usize> {
        self.zones.iter().position(|z| &z.id == id)
    }

    /// 1-based display number of a zone. Derived from position.
    #[must_use]
    pub fn display_number(&self, id: &ZoneId) -> Option<usize> {
        self.index_of(id).map(|i| i + 1)
    }

    /// Apply a sparse update to an existing zone.
    ///
    /// Returns `false` without any effect when `id` is no longer present —
    /// an edit racing a concurrent delete must neither resurrect the zone
    /// nor error. A new bounding box is renormalized (width/height
    /// recomputed from the corners), and any geometry or rotation change
    /// drops the cached crop.
    pub fn apply_partial(&mut self, id: &ZoneId, partial: &PartialZone) -> bool {
        let Some(zone) = self.zones.iter_mut().find(|z| &z.id == id) else {
            return false;
        };
        let mut geometry_changed = false;
        if let Some(ref text) = partial.text {
            zone.text.clone_from(text);
        }
        if let Some(confidence) = partial.confidence {
            zone.confidence = confidence;
        }
        if let Some(bbox) = partial.bbox {
            zone.bbox = bbox.normalized();
            geometry_changed = true;
        }
        if let Some(ref polygon) = partial.polygon {
            zone.polygon = Some(polygon.clone());
        }
        if let Some(rotation) = partial.rotation {
            if (rotation - zone.rotation).abs() > f64::EPSILON {
                geometry_changed = true;
            }
            zone.rotation = rotation;
        }
        if let Some(orientation) = partial.text_orientation {
            zone.text_orientation = orientation;
        }
        if let Some(offset) = partial.bubble_offset {
            zone.bubble_offset = Some(offset);
        }
        if let Some(tolerance) = partial.tolerance {
            zone.tolerance = Some(tolerance);
        }
        if geometry_changed {
            zone.cropped_image = None;
        }
        // A crop supplied alongside new geometry is already current.
        if let Some(ref image) = partial.cropped_image {
            zone.cropped_image = Some(image.clone());
        }
        true
    }

    /// Replace a zone's text and re-derive its tolerance annotation.
    /// Returns `false` when `id` is not present.
    pub fn set_text(&mut self, id: &ZoneId, text: &str) -> bool {
        let Some(zone) = self.zones.iter_mut().find(|z| &z.id == id) else {
            return false;
        };
        zone.text = text.to_string();
        zone.tolerance = parse_tolerance(text);
        true
    }

    /// Remove a zone, preserving the relative order of the others. The
    /// removed zone is snapshotted for [`ZoneStore::undo_restore`].
    pub fn remove(&mut self, id: &ZoneId) -> Option<Zone> {
        let index = self.index_of(id)?;
        let zone = self.zones.remove(index);
        if self.removed.len() == UNDO_CAPACITY {
            self.removed.pop_front();
        }
        self.removed.push_back(Removed { zone: zone.clone(), index });
        Some(zone)
    }

    /// Restore the most recent snapshot containing `id`, at its old
    /// position (clamped to the current length). Best-effort, last-write-
    /// wins; returns `false` when no snapshot matches or the id is live.
    pub fn undo_restore(&mut self, id: &ZoneId) -> bool {
        if self.contains(id) {
            return false;
        }
        let Some(pos) = self.removed.iter().rposition(|r| &r.zone.id == id) else {
            return false;
        };
        let Some(snapshot) = self.removed.remove(pos) else {
            return false;
        };
        let index = snapshot.index.min(self.zones.len());
        self.zones.insert(index, snapshot.zone);
        true
    }

    /// Drop all zones. Prior user confirmation is the caller's concern.
    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// All zones in insertion order (bottom-most first).
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Iterate topmost-first (reverse insertion order) for hit-testing.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for ZoneStore {
    fn default() -> Self {
        Self::new()
    }
}
