//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Minimum zone width/height in image pixels, enforced when resizing and
/// when creating a zone from a drawn region.
pub const MIN_ZONE_SIZE: f64 = 10.0;

/// Minimum vertex count for a polygon to override the bounding box in
/// hit-testing and rendering.
pub const MIN_POLYGON_VERTICES: usize = 4;

// ── Hit-testing ─────────────────────────────────────────────────

/// Pixel band around the bounding box within which a pointer grabs a
/// resize handle instead of the zone body.
pub const RESIZE_BAND_PX: f64 = 12.0;

/// Radius of the numbered bubble marker, in image pixels.
pub const BUBBLE_RADIUS: f64 = 14.0;

/// Clearance between a bubble and the canvas edge before the marker is
/// relocated to the opposite side of its box.
pub const BUBBLE_EDGE_MARGIN: f64 = 4.0;

/// Clearance from every existing zone required for a double-click to count
/// as an empty-space point query.
pub const DOUBLE_CLICK_CLEARANCE_PX: f64 = 12.0;

// ── Recognition-driven behavior ─────────────────────────────────

/// Zones whose text orientation magnitude exceeds this many degrees are
/// candidates for the post-detection improvement pass.
pub const IMPROVE_ORIENTATION_THRESHOLD_DEG: f64 = 15.0;

/// Fixed step applied by the rotate action, in degrees.
pub const ROTATE_STEP_DEG: f64 = 90.0;
