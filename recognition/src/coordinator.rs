//! Recognition coordinator — sequences service queries and merges results.
//!
//! DESIGN
//! ======
//! The coordinator owns the recognizer and drives the canvas engine:
//! whole-image detection on upload, a sequential auto-improvement pass for
//! rotated zones, re-recognition after geometry edits, and the rotate
//! action. Every operation publishes a short human-readable status string
//! on a watch channel and holds the engine's busy flag while a request is
//! in flight, so the interaction controller ignores new pointer-initiated
//! queries meanwhile. Responses that target a zone deleted mid-flight die
//! in the store's existence check — a silent no-op, never an error.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use canvas::consts::{IMPROVE_ORIENTATION_THRESHOLD_DEG, ROTATE_STEP_DEG};
use canvas::engine::EngineCore;
use canvas::tolerance::parse_tolerance;
use canvas::view::Point;
use canvas::zone::{BoundingBox, PartialZone, Zone, ZoneId};

use super::client::HttpRecognizer;
use super::config::RecognizerConfig;
use super::retry::with_retry;
use super::thumb;
use super::types::{DetectMode, Detection, RecognitionError, Recognizer, WireBox};

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;

pub struct Coordinator<R: Recognizer> {
    recognizer: R,
    retries: u32,
    retry_delay: Duration,
    status: watch::Sender<String>,
}

impl Coordinator<HttpRecognizer> {
    /// Coordinator over an HTTP recognizer configured from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is missing or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Self, RecognitionError> {
        let config = RecognizerConfig::from_env()?;
        let retries = config.retries;
        let retry_delay = config.retry_delay;
        Ok(Self::new(HttpRecognizer::new(config)?, retries, retry_delay))
    }
}

impl<R: Recognizer> Coordinator<R> {
    #[must_use]
    pub fn new(recognizer: R, retries: u32, retry_delay: Duration) -> Self {
        let (status, _) = watch::channel(String::new());
        Self { recognizer, retries, retry_delay, status }
    }

    /// Subscribe to human-readable progress strings.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    fn set_status(&self, message: impl Into<String>) {
        self.status.send_replace(message.into());
    }

    // =========================================================================
    // INITIAL DETECTION
    // =========================================================================

    /// Whole-image detection at the most accurate tier; populates the
    /// store with one zone per returned detection, in return order.
    /// Returns the number of zones created.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted;
    /// the store is left untouched in that case.
    pub async fn initial_detect(&self, image: &[u8], engine: &mut EngineCore) -> Result<usize, RecognitionError> {
        if engine.busy() {
            return Ok(0);
        }
        engine.set_busy(true);
        self.set_status("Detecting text zones…");

        let result = with_retry(self.retries, self.retry_delay, || {
            self.recognizer.detect_all(image, DetectMode::Accurate)
        })
        .await;
        engine.set_busy(false);

        match result {
            Ok(response) => {
                let zones: Vec<Zone> = response.zones.into_iter().map(zone_from_detection).collect();
                let count = zones.len();
                engine.apply_detections(zones);
                info!(count, "initial detection complete");
                self.set_status(format!("Found {count} zones"));
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "initial detection failed");
                self.set_status(format!("Detection failed: {e}"));
                Err(e)
            }
        }
    }

    // =========================================================================
    // AUTO-IMPROVEMENT PASS
    // =========================================================================

    /// Re-query zones whose text orientation suggests the whole-image pass
    /// read them poorly. Strictly sequential to bound backend load; each
    /// item's failure is logged and skipped, never aborting the queue.
    /// Returns the number of zones whose text changed.
    pub async fn auto_improve(&self, image: &[u8], engine: &mut EngineCore) -> usize {
        if engine.busy() {
            return 0;
        }
        let candidates: Vec<(ZoneId, Point, String)> = engine
            .store
            .zones()
            .iter()
            .filter(|zone| zone.text_orientation.abs() > IMPROVE_ORIENTATION_THRESHOLD_DEG)
            .map(|zone| (zone.id, zone.bbox.center(), zone.text.clone()))
            .collect();
        if candidates.is_empty() {
            return 0;
        }

        engine.set_busy(true);
        let total = candidates.len();
        let mut improved = 0;
        for (index, (id, center, old_text)) in candidates.into_iter().enumerate() {
            self.set_status(format!("Improving rotated zones ({}/{total})…", index + 1));
            let result = with_retry(self.retries, self.retry_delay, || {
                self.recognizer.detect_at_point(image, center.x, center.y)
            })
            .await;
            match result {
                Ok(Some(detection)) if detection.text != old_text => {
                    let fields = PartialZone {
                        text: Some(detection.text.clone()),
                        confidence: Some(detection.confidence),
                        bbox: Some(detection.bbox.to_bounding_box()),
                        polygon: detection.polygon.as_ref().map(|poly| to_points(poly)),
                        tolerance: detection
                            .tolerance
                            .or_else(|| parse_tolerance(&detection.text)),
                        ..PartialZone::default()
                    };
                    if engine.apply_update(&id, &fields) {
                        improved += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // One bad zone must not starve the rest of the queue.
                    warn!(zone = %id, error = %e, "auto-improve query failed; continuing");
                }
            }
        }
        engine.set_busy(false);
        info!(improved, total, "auto-improvement pass complete");
        self.set_status(format!("Improved {improved} of {total} rotated zones"));
        improved
    }

    // =========================================================================
    // RE-RECOGNITION
    // =========================================================================

    /// Re-read a zone's current box, overwriting text and confidence. The
    /// box is preserved. Returns whether the zone was updated.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted;
    /// zone state is left untouched in that case.
    pub async fn reocr_zone(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        id: &ZoneId,
    ) -> Result<bool, RecognitionError> {
        self.reocr_inner(image, engine, id, false).await
    }

    /// Like [`Coordinator::reocr_zone`], but also adopts the recognizer's
    /// tighter returned box.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted.
    pub async fn reocr_zone_fit(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        id: &ZoneId,
    ) -> Result<bool, RecognitionError> {
        self.reocr_inner(image, engine, id, true).await
    }

    async fn reocr_inner(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        id: &ZoneId,
        fit: bool,
    ) -> Result<bool, RecognitionError> {
        if engine.busy() {
            return Ok(false);
        }
        let Some(zone) = engine.zone(id) else {
            return Ok(false);
        };
        let rect = WireBox::from_bounding_box(&zone.bbox);
        let rotation = rotation_hint(zone.rotation);
        let number = engine.store.display_number(id).unwrap_or_default();

        engine.set_busy(true);
        self.set_status(format!("Re-reading zone #{number}…"));
        let result = with_retry(self.retries, self.retry_delay, || {
            self.recognizer.detect_in_rect(image, rect, rotation)
        })
        .await;
        engine.set_busy(false);

        match result {
            Ok(Some(detection)) => {
                let adopted_box = fit.then(|| detection.bbox.to_bounding_box());
                let updated = self.merge_recognized_text(engine, id, &detection, adopted_box);
                self.set_status(format!("Zone #{number} updated"));
                Ok(updated)
            }
            Ok(None) => {
                self.set_status(format!("No text found in zone #{number}"));
                Ok(false)
            }
            Err(e) => {
                warn!(zone = %id, error = %e, "re-recognition failed");
                self.set_status(format!("Re-read failed: {e}"));
                Err(e)
            }
        }
    }

    // =========================================================================
    // ROTATE
    // =========================================================================

    /// Advance a zone's orientation by the fixed step, regenerate its
    /// cached thumbnail locally, and re-read its text with the new
    /// rotation hint. Box geometry is preserved regardless of the query
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted;
    /// the rotation and thumbnail still apply in that case.
    pub async fn rotate_zone(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        id: &ZoneId,
    ) -> Result<(), RecognitionError> {
        if engine.busy() {
            return Ok(());
        }
        let Some(zone) = engine.zone(id) else {
            return Ok(());
        };
        let bbox = zone.bbox;
        let rotation = (zone.rotation + ROTATE_STEP_DEG).rem_euclid(360.0);
        let number = engine.store.display_number(id).unwrap_or_default();

        engine.apply_update(id, &PartialZone { rotation: Some(rotation), ..PartialZone::default() });
        match thumb::render_thumbnail(image, &bbox, rotation) {
            Ok(encoded) => {
                engine.apply_update(id, &PartialZone { cropped_image: Some(encoded), ..PartialZone::default() });
            }
            Err(e) => {
                // The rotation itself stands; only the cached crop is lost.
                warn!(zone = %id, error = %e, "thumbnail regeneration failed");
            }
        }

        engine.set_busy(true);
        self.set_status(format!("Rotating zone #{number}…"));
        let rect = WireBox::from_bounding_box(&bbox);
        let result = with_retry(self.retries, self.retry_delay, || {
            self.recognizer.detect_in_rect(image, rect, Some(rotation))
        })
        .await;
        engine.set_busy(false);

        match result {
            Ok(Some(detection)) => {
                // Text refresh only — the box never follows the query here.
                self.merge_recognized_text(engine, id, &detection, None);
                self.set_status(format!("Zone #{number} rotated"));
                Ok(())
            }
            Ok(None) => {
                self.set_status(format!("Zone #{number} rotated (no text found)"));
                Ok(())
            }
            Err(e) => {
                warn!(zone = %id, error = %e, "post-rotate re-read failed");
                self.set_status(format!("Rotate re-read failed: {e}"));
                Err(e)
            }
        }
    }

    // =========================================================================
    // THUMBNAILS
    // =========================================================================

    /// Ensure a zone's cached crop exists, regenerating it from the source
    /// image when a geometry change has invalidated it. Returns whether a
    /// crop is available afterwards.
    pub fn ensure_thumbnail(&self, image: &[u8], engine: &mut EngineCore, id: &ZoneId) -> bool {
        let Some(zone) = engine.zone(id) else {
            return false;
        };
        if zone.cropped_image.is_some() {
            return true;
        }
        let bbox = zone.bbox;
        let rotation = zone.rotation;
        match thumb::render_thumbnail(image, &bbox, rotation) {
            Ok(encoded) => {
                engine.apply_update(id, &PartialZone { cropped_image: Some(encoded), ..PartialZone::default() })
            }
            Err(e) => {
                warn!(zone = %id, error = %e, "thumbnail generation failed");
                false
            }
        }
    }

    // =========================================================================
    // POINT AND REGION QUERIES
    // =========================================================================

    /// Single-point lookup (double-click on empty canvas). On success the
    /// detection becomes a new topmost zone.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted.
    pub async fn query_point(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        x: f64,
        y: f64,
    ) -> Result<Option<ZoneId>, RecognitionError> {
        if engine.busy() {
            return Ok(None);
        }
        engine.set_busy(true);
        self.set_status("Reading point…");
        let result = with_retry(self.retries, self.retry_delay, || {
            self.recognizer.detect_at_point(image, x, y)
        })
        .await;
        engine.set_busy(false);

        self.finish_creation(engine, result)
    }

    /// Recognition over a user-drawn rectangle. On success the detection
    /// becomes a new topmost zone.
    ///
    /// # Errors
    ///
    /// Returns the transport/validation error after retries are exhausted.
    pub async fn create_from_region(
        &self,
        image: &[u8],
        engine: &mut EngineCore,
        region: BoundingBox,
    ) -> Result<Option<ZoneId>, RecognitionError> {
        if engine.busy() {
            return Ok(None);
        }
        engine.set_busy(true);
        self.set_status("Reading region…");
        let rect = WireBox::from_bounding_box(&region);
        let result = with_retry(self.retries, self.retry_delay, || {
            self.recognizer.detect_in_rect(image, rect, None)
        })
        .await;
        engine.set_busy(false);

        self.finish_creation(engine, result)
    }

    // =========================================================================
    // MERGING
    // =========================================================================

    fn finish_creation(
        &self,
        engine: &mut EngineCore,
        result: Result<Option<Detection>, RecognitionError>,
    ) -> Result<Option<ZoneId>, RecognitionError> {
        match result {
            Ok(Some(detection)) => {
                let zone = zone_from_detection(detection);
                let id = zone.id;
                engine.apply_zone_created(zone);
                let number = engine.store.display_number(&id).unwrap_or_default();
                self.set_status(format!("Zone #{number} added"));
                Ok(Some(id))
            }
            Ok(None) => {
                self.set_status("No text found");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "recognition query failed");
                self.set_status(format!("Recognition failed: {e}"));
                Err(e)
            }
        }
    }

    /// Overwrite a zone's recognized text (and derived tolerance), its
    /// confidence, and optionally its box. Stale targets are no-ops.
    fn merge_recognized_text(
        &self,
        engine: &mut EngineCore,
        id: &ZoneId,
        detection: &Detection,
        adopted_box: Option<BoundingBox>,
    ) -> bool {
        // set_text re-derives the tolerance, clearing it for non-numeric
        // text; a service-provided annotation then takes precedence.
        engine.set_text(id, &detection.text);
        let fields = PartialZone {
            confidence: Some(detection.confidence),
            bbox: adopted_box,
            polygon: detection.polygon.as_ref().map(|poly| to_points(poly)),
            tolerance: detection.tolerance,
            ..PartialZone::default()
        };
        engine.apply_update(id, &fields)
    }
}

// =============================================================================
// DETECTION MAPPING
// =============================================================================

/// Map a service detection into a fresh zone: local id, normalized box,
/// carried polygon/rotation/tolerance. Empty detections keep the zero-
/// confidence sentinel.
#[must_use]
pub fn zone_from_detection(detection: Detection) -> Zone {
    let confidence = if detection.is_empty { 0.0 } else { detection.confidence };
    let tolerance = detection
        .tolerance
        .or_else(|| parse_tolerance(&detection.text));
    Zone {
        id: Uuid::new_v4(),
        text: detection.text,
        confidence,
        bbox: detection.bbox.to_bounding_box(),
        polygon: detection.polygon.as_ref().map(|poly| to_points(poly)),
        rotation: detection.rotation.unwrap_or(0.0),
        text_orientation: detection.text_orientation.unwrap_or(0.0),
        cropped_image: None,
        bubble_offset: None,
        tolerance,
    }
}

fn to_points(wire: &[super::types::WirePoint]) -> Vec<Point> {
    wire.iter().map(|p| Point::new(p.x, p.y)).collect()
}

fn rotation_hint(rotation: f64) -> Option<f64> {
    if rotation.abs() > f64::EPSILON { Some(rotation) } else { None }
}
