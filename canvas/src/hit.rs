//! Hit-testing: pure geometry queries over zones.
//!
//! All functions here operate on coordinates already mapped into image
//! space (see [`crate::view`]) and are side-effect-free. Zone counts are
//! small, so every query is a linear scan in z-order.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{BUBBLE_EDGE_MARGIN, BUBBLE_RADIUS, MIN_POLYGON_VERTICES, RESIZE_BAND_PX};
use crate::store::ZoneStore;
use crate::view::{Point, Viewport};
use crate::zone::{BoundingBox, Zone, ZoneId};

/// Which part of a zone a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The numbered bubble marker.
    Bubble,
    /// One of the eight resize regions around the bounding box.
    ResizeHandle(ResizeAnchor),
    /// The zone interior.
    Body,
}

/// Anchor position for the eight resize regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// Whether this anchor moves the top edge (`y1`).
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Whether this anchor moves the bottom edge (`y2`).
    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Whether this anchor moves the right edge (`x2`).
    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Whether this anchor moves the left edge (`x1`).
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

/// Ray-casting point-in-polygon test, even-odd rule.
///
/// Correct for non-self-intersecting polygons; self-intersecting input is
/// not a supported shape and the result for it is unspecified.
#[must_use]
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_at = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether `point` hits `zone`.
///
/// The bounding box is checked first as a fast reject. When the box
/// contains the point and the zone carries a well-formed polygon, the
/// polygon decides; the box is the reliable fallback when polygon data is
/// malformed or absent.
#[must_use]
pub fn hit_test_zone(point: Point, zone: &Zone) -> bool {
    if !zone.bbox.contains(point) {
        return false;
    }
    match &zone.polygon {
        Some(polygon) if polygon.len() >= MIN_POLYGON_VERTICES => point_in_polygon(point, polygon),
        _ => true,
    }
}

/// Topmost zone containing `point`, scanning in reverse insertion order.
#[must_use]
pub fn find_top_zone_at(point: Point, store: &ZoneStore) -> Option<&Zone> {
    store.iter_top_down().find(|zone| hit_test_zone(point, zone))
}

/// Classify proximity to one of the eight resize regions around `bbox`.
///
/// Corners take priority over edges when both are in range. Returns `None`
/// when the point is outside the band entirely.
#[must_use]
pub fn resize_anchor_at(point: Point, bbox: &BoundingBox) -> Option<ResizeAnchor> {
    let band = RESIZE_BAND_PX;
    let within = point.x >= bbox.x1 - band
        && point.x <= bbox.x2 + band
        && point.y >= bbox.y1 - band
        && point.y <= bbox.y2 + band;
    if !within {
        return None;
    }

    let near_left = (point.x - bbox.x1).abs() <= band;
    let near_right = (point.x - bbox.x2).abs() <= band;
    let near_top = (point.y - bbox.y1).abs() <= band;
    let near_bottom = (point.y - bbox.y2).abs() <= band;

    // When both sides of an axis are in range (small boxes), the nearer
    // edge wins. Corners take priority over edges.
    let west = match (near_left, near_right) {
        (true, true) => Some((point.x - bbox.x1).abs() <= (point.x - bbox.x2).abs()),
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let north = match (near_top, near_bottom) {
        (true, true) => Some((point.y - bbox.y1).abs() <= (point.y - bbox.y2).abs()),
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };

    match (north, west) {
        (Some(true), Some(true)) => Some(ResizeAnchor::Nw),
        (Some(true), Some(false)) => Some(ResizeAnchor::Ne),
        (Some(false), Some(true)) => Some(ResizeAnchor::Sw),
        (Some(false), Some(false)) => Some(ResizeAnchor::Se),
        (Some(true), None) => Some(ResizeAnchor::N),
        (Some(false), None) => Some(ResizeAnchor::S),
        (None, Some(true)) => Some(ResizeAnchor::W),
        (None, Some(false)) => Some(ResizeAnchor::E),
        (None, None) => None,
    }
}

/// CSS cursor name for a resize anchor; `None` maps to the move cursor.
#[must_use]
pub fn cursor_for_anchor(anchor: Option<ResizeAnchor>) -> &'static str {
    match anchor {
        Some(ResizeAnchor::N | ResizeAnchor::S) => "ns-resize",
        Some(ResizeAnchor::E | ResizeAnchor::W) => "ew-resize",
        Some(ResizeAnchor::Ne | ResizeAnchor::Sw) => "nesw-resize",
        Some(ResizeAnchor::Nw | ResizeAnchor::Se) => "nwse-resize",
        None => "move",
    }
}

/// Default "smart" bubble center: diagonally off the box's top-left corner.
#[must_use]
pub fn default_bubble_center(bbox: &BoundingBox) -> Point {
    Point::new(
        bbox.x1 - BUBBLE_RADIUS - BUBBLE_EDGE_MARGIN,
        bbox.y1 - BUBBLE_RADIUS - BUBBLE_EDGE_MARGIN,
    )
}

/// Bubble center for a zone, honoring a user-dragged offset when present.
/// A stored offset is relative to the box's top-left corner.
#[must_use]
pub fn bubble_center(zone: &Zone) -> Point {
    match zone.bubble_offset {
        Some(offset) => Point::new(zone.bbox.x1 + offset.dx, zone.bbox.y1 + offset.dy),
        None => default_bubble_center(&zone.bbox),
    }
}

/// Keep a bubble fully visible: when `center` is within `radius` plus a
/// margin of a canvas edge, relocate it to the opposite side of the box.
///
/// Evaluated once per render; the stored `bubble_offset` is never changed
/// by clamping.
#[must_use]
pub fn clamp_bubble(center: Point, bbox: &BoundingBox, viewport: &Viewport, radius: f64) -> Point {
    let clearance = radius + BUBBLE_EDGE_MARGIN;
    let mut clamped = center;
    if clamped.x < clearance {
        clamped.x = bbox.x2 + clearance;
    } else if clamped.x > viewport.image_width - clearance {
        clamped.x = bbox.x1 - clearance;
    }
    if clamped.y < clearance {
        clamped.y = bbox.y2 + clearance;
    } else if clamped.y > viewport.image_height - clearance {
        clamped.y = bbox.y1 - clearance;
    }
    clamped
}

/// Whether `point` grabs a bubble drawn at `center`.
#[must_use]
pub fn bubble_hit(point: Point, center: Point, radius: f64) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Result of a scene hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub zone_id: ZoneId,
    pub part: HitPart,
}

/// Test what `point` lands on.
///
/// Bubbles are checked first across all zones: they render outside their
/// zone's box and must remain grabbable even over other zones. Zones are
/// then scanned in z-order, checking the resize band before the body so
/// the resize-vs-move decision matches what the cursor feedback promised.
#[must_use]
pub fn hit_scene(point: Point, store: &ZoneStore, viewport: &Viewport) -> Option<Hit> {
    for zone in store.iter_top_down() {
        let center = clamp_bubble(bubble_center(zone), &zone.bbox, viewport, BUBBLE_RADIUS);
        if bubble_hit(point, center, BUBBLE_RADIUS) {
            return Some(Hit { zone_id: zone.id, part: HitPart::Bubble });
        }
    }
    for zone in store.iter_top_down() {
        if let Some(anchor) = resize_anchor_at(point, &zone.bbox) {
            return Some(Hit { zone_id: zone.id, part: HitPart::ResizeHandle(anchor) });
        }
        if hit_test_zone(point, zone) {
            return Some(Hit { zone_id: zone.id, part: HitPart::Body });
        }
    }
    None
}
