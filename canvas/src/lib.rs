//! Zone state machine and geometry engine for the annotation canvas.
//!
//! This crate owns the authoritative set of text zones overlaid on an
//! uploaded image: it interprets pointer input against hit-testing over
//! possibly rotated/polygonal regions, mediates move/resize/bubble drags
//! through an optimistic overlay, and keeps derived artifacts (display
//! numbering, tolerance annotations, cached crops) consistent as zones are
//! added, edited, or removed. The host layer is responsible only for
//! wiring native input events to [`engine::EngineCore`] and processing the
//! resulting [`engine::Action`]s; asynchronous recognition lives in the
//! sibling `recognition` crate.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction controller and testable [`engine::EngineCore`] |
//! | [`store`] | Ordered zone store with one-step delete undo |
//! | [`zone`] | Zone, bounding box, and sparse-update types |
//! | [`hit`] | Hit-testing over boxes, polygons, handles, and bubbles |
//! | [`view`] | Screen/image coordinate mapping |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`tolerance`] | Numeric tolerance parsing from zone text |
//! | [`consts`] | Shared numeric constants (sizes, bands, thresholds) |

pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod store;
pub mod tolerance;
pub mod view;
pub mod zone;
