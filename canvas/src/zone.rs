//! Zone model: detected text regions, their geometry, and sparse updates.
//!
//! This module defines the central entity of the canvas (`Zone`), its
//! axis-aligned anchor geometry (`BoundingBox`), and a sparse-update type
//! for incremental edits (`PartialZone`). Serialized field names are the
//! export contract consumed by downstream JSON/PDF collaborators and must
//! not change without updating them.
//!
//! Data flows into this layer from the recognition service (detection
//! responses mapped to zones) and from the interaction engine (geometry
//! mutations). The renderer reads zones in store order to determine both
//! display numbering and draw order.

#[cfg(test)]
#[path = "zone_test.rs"]
mod zone_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::MIN_POLYGON_VERTICES;
use crate::tolerance::ToleranceInfo;
use crate::view::Point;

/// Unique identifier for a zone. Assigned at creation, immutable.
pub type ZoneId = Uuid;

/// Axis-aligned rectangle in image pixel coordinates.
///
/// The corners are authoritative; `width` and `height` are derived and
/// recomputed from the corners on every geometry mutation. After
/// [`BoundingBox::normalized`], `x1 <= x2` and `y1 <= y2` hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Derived: `x2 - x1`. Never authoritative.
    pub width: f64,
    /// Derived: `y2 - y1`. Never authoritative.
    pub height: f64,
}

impl BoundingBox {
    /// Build a normalized box from two opposite corners, in any order.
    #[must_use]
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2, width: 0.0, height: 0.0 }.normalized()
    }

    /// Swap inverted corners and recompute the derived width/height.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (x1, x2) = if self.x1 <= self.x2 { (self.x1, self.x2) } else { (self.x2, self.x1) };
        let (y1, y2) = if self.y1 <= self.y2 { (self.y1, self.y2) } else { (self.y2, self.y1) };
        Self { x1, y1, x2, y2, width: x2 - x1, height: y2 - y1 }
    }

    /// Whether `p` lies within the box, boundary inclusive.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Uniform translation of all four corners.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::from_corners(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// The box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self::from_corners(self.x1 - margin, self.y1 - margin, self.x2 + margin, self.y2 + margin)
    }
}

/// User-adjusted displacement of a zone's numbered bubble marker from the
/// box's top-left corner. Absent until the user drags the marker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BubbleOffset {
    pub dx: f64,
    pub dy: f64,
}

/// A detected or user-created text region with geometry, recognized text,
/// and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    /// Recognized (or user-edited) string content.
    pub text: String,
    /// Recognition confidence in `[0, 1]`; `0.0` marks an empty zone.
    pub confidence: f64,
    /// Authoritative geometry for resize/move math, handles, and anchors.
    pub bbox: BoundingBox,
    /// Optional non-axis-aligned outline for rotated text. When well-formed
    /// it takes precedence over `bbox` for hit-testing and rendering; it is
    /// never derived from or reconciled with `bbox`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Point>>,
    /// Crop orientation hint in degrees, quantized by the rotate action.
    #[serde(default)]
    pub rotation: f64,
    /// Text orientation reported by the recognizer, in degrees.
    #[serde(rename = "textOrientation", default)]
    pub text_orientation: f64,
    /// Cached base64 PNG crop of the zone's pixels. Dropped whenever the
    /// box or rotation changes; regenerated lazily.
    #[serde(rename = "croppedImage", default, skip_serializing_if = "Option::is_none")]
    pub cropped_image: Option<String>,
    /// Bubble displacement, present only once the user has dragged the
    /// marker; otherwise the renderer computes a default position.
    #[serde(rename = "bubbleOffset", default, skip_serializing_if = "Option::is_none")]
    pub bubble_offset: Option<BubbleOffset>,
    /// Parsed numeric annotation for export/reporting.
    #[serde(rename = "toleranceInfo", default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<ToleranceInfo>,
}

impl Zone {
    /// Whether the polygon is usable for hit-testing and rendering.
    #[must_use]
    pub fn has_well_formed_polygon(&self) -> bool {
        self.polygon
            .as_ref()
            .is_some_and(|poly| poly.len() >= MIN_POLYGON_VERTICES)
    }

    /// Whether the recognizer found no text here.
    #[must_use]
    pub fn is_empty_zone(&self) -> bool {
        self.confidence <= 0.0
    }
}

/// Sparse update for a zone. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialZone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(rename = "textOrientation", default, skip_serializing_if = "Option::is_none")]
    pub text_orientation: Option<f64>,
    #[serde(rename = "croppedImage", default, skip_serializing_if = "Option::is_none")]
    pub cropped_image: Option<String>,
    #[serde(rename = "bubbleOffset", default, skip_serializing_if = "Option::is_none")]
    pub bubble_offset: Option<BubbleOffset>,
    #[serde(rename = "toleranceInfo", default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<ToleranceInfo>,
}

impl PartialZone {
    /// A partial that replaces only the bounding box.
    #[must_use]
    pub fn with_bbox(bbox: BoundingBox) -> Self {
        Self { bbox: Some(bbox), ..Self::default() }
    }

    /// A partial that replaces only the bubble offset.
    #[must_use]
    pub fn with_bubble_offset(offset: BubbleOffset) -> Self {
        Self { bubble_offset: Some(offset), ..Self::default() }
    }
}
