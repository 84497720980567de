#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::tolerance::parse_tolerance;
use crate::view::Point;

fn make_zone(x1: f64, y1: f64, x2: f64, y2: f64) -> Zone {
    Zone {
        id: Uuid::new_v4(),
        text: "M10".into(),
        confidence: 0.92,
        bbox: BoundingBox::from_corners(x1, y1, x2, y2),
        polygon: None,
        rotation: 0.0,
        text_orientation: 0.0,
        cropped_image: None,
        bubble_offset: None,
        tolerance: None,
    }
}

// =============================================================
// BoundingBox
// =============================================================

#[test]
fn from_corners_computes_derived_size() {
    let bbox = BoundingBox::from_corners(10.0, 20.0, 50.0, 80.0);
    assert_eq!(bbox.width, 40.0);
    assert_eq!(bbox.height, 60.0);
}

#[test]
fn from_corners_normalizes_inverted_input() {
    let bbox = BoundingBox::from_corners(50.0, 80.0, 10.0, 20.0);
    assert_eq!(bbox.x1, 10.0);
    assert_eq!(bbox.y1, 20.0);
    assert_eq!(bbox.x2, 50.0);
    assert_eq!(bbox.y2, 80.0);
    assert_eq!(bbox.width, 40.0);
    assert_eq!(bbox.height, 60.0);
}

#[test]
fn normalized_recomputes_width_height_from_corners() {
    let mut bbox = BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0);
    bbox.x2 = 35.0;
    let fixed = bbox.normalized();
    assert_eq!(fixed.width, 35.0);
    assert_eq!(fixed.height, 10.0);
}

#[test]
fn contains_is_boundary_inclusive() {
    let bbox = BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains(Point::new(0.0, 0.0)));
    assert!(bbox.contains(Point::new(10.0, 10.0)));
    assert!(bbox.contains(Point::new(5.0, 5.0)));
    assert!(!bbox.contains(Point::new(10.1, 5.0)));
}

#[test]
fn center_is_midpoint() {
    let bbox = BoundingBox::from_corners(10.0, 10.0, 30.0, 50.0);
    assert_eq!(bbox.center(), Point::new(20.0, 30.0));
}

#[test]
fn translated_moves_all_corners_uniformly() {
    let bbox = BoundingBox::from_corners(10.0, 10.0, 50.0, 50.0).translated(5.0, -5.0);
    assert_eq!(bbox.x1, 15.0);
    assert_eq!(bbox.y1, 5.0);
    assert_eq!(bbox.x2, 55.0);
    assert_eq!(bbox.y2, 45.0);
    assert_eq!(bbox.width, 40.0);
    assert_eq!(bbox.height, 40.0);
}

#[test]
fn expanded_grows_every_side() {
    let bbox = BoundingBox::from_corners(10.0, 10.0, 20.0, 20.0).expanded(3.0);
    assert_eq!(bbox.x1, 7.0);
    assert_eq!(bbox.y2, 23.0);
}

// =============================================================
// Zone polygon well-formedness
// =============================================================

#[test]
fn zone_without_polygon_is_not_well_formed() {
    let zone = make_zone(0.0, 0.0, 10.0, 10.0);
    assert!(!zone.has_well_formed_polygon());
}

#[test]
fn zone_with_three_vertices_is_not_well_formed() {
    let mut zone = make_zone(0.0, 0.0, 10.0, 10.0);
    zone.polygon = Some(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)]);
    assert!(!zone.has_well_formed_polygon());
}

#[test]
fn zone_with_four_vertices_is_well_formed() {
    let mut zone = make_zone(0.0, 0.0, 10.0, 10.0);
    zone.polygon = Some(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]);
    assert!(zone.has_well_formed_polygon());
}

#[test]
fn zero_confidence_marks_empty_zone() {
    let mut zone = make_zone(0.0, 0.0, 10.0, 10.0);
    zone.confidence = 0.0;
    assert!(zone.is_empty_zone());
    zone.confidence = 0.4;
    assert!(!zone.is_empty_zone());
}

// =============================================================
// Export contract serde
// =============================================================

#[test]
fn zone_export_uses_contract_field_names() {
    let mut zone = make_zone(100.0, 70.0, 140.0, 95.0);
    zone.text_orientation = 45.0;
    zone.cropped_image = Some("aGVsbG8=".into());
    zone.tolerance = parse_tolerance("12.5 ±0.1");
    let json = serde_json::to_value(&zone).unwrap();
    assert!(json.get("textOrientation").is_some());
    assert!(json.get("croppedImage").is_some());
    assert!(json.get("toleranceInfo").is_some());
    assert_eq!(json["bbox"]["width"], 40.0);
    assert_eq!(json["bbox"]["height"], 25.0);
}

#[test]
fn zone_export_omits_absent_optionals() {
    let zone = make_zone(0.0, 0.0, 10.0, 10.0);
    let json = serde_json::to_value(&zone).unwrap();
    assert!(json.get("polygon").is_none());
    assert!(json.get("croppedImage").is_none());
    assert!(json.get("bubbleOffset").is_none());
    assert!(json.get("toleranceInfo").is_none());
}

#[test]
fn zone_roundtrip_preserves_text_bbox_tolerance() {
    let mut zone = make_zone(10.0, 20.0, 110.0, 60.0);
    zone.text = "Ø6 H7".into();
    zone.tolerance = parse_tolerance("Ø6 +0.012/-0.000");
    zone.polygon = Some(vec![
        Point::new(10.0, 20.0),
        Point::new(110.0, 20.0),
        Point::new(110.0, 60.0),
        Point::new(10.0, 60.0),
    ]);
    let json = serde_json::to_string(&zone).unwrap();
    let back: Zone = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, zone.id);
    assert_eq!(back.text, zone.text);
    assert_eq!(back.bbox, zone.bbox);
    assert_eq!(back.tolerance, zone.tolerance);
    assert_eq!(back.polygon, zone.polygon);
}

// =============================================================
// PartialZone
// =============================================================

#[test]
fn partial_default_is_all_absent() {
    let partial = PartialZone::default();
    let json = serde_json::to_value(&partial).unwrap();
    assert_eq!(json, serde_json::json!({}));
}

#[test]
fn partial_with_bbox_sets_only_bbox() {
    let partial = PartialZone::with_bbox(BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0));
    assert!(partial.bbox.is_some());
    assert!(partial.text.is_none());
    assert!(partial.bubble_offset.is_none());
}

#[test]
fn partial_with_bubble_offset_sets_only_offset() {
    let partial = PartialZone::with_bubble_offset(BubbleOffset { dx: 3.0, dy: -4.0 });
    assert_eq!(partial.bubble_offset, Some(BubbleOffset { dx: 3.0, dy: -4.0 }));
    assert!(partial.bbox.is_none());
}

#[test]
fn partial_serde_skips_absent_fields() {
    let partial = PartialZone { text: Some("M8".into()), ..PartialZone::default() };
    let json = serde_json::to_string(&partial).unwrap();
    assert_eq!(json, r#"{"text":"M8"}"#);
}
