//! Recognition types — service-neutral wire types and errors.
//!
//! The recognition backend is a black box consumed over HTTP. This module
//! defines the three query shapes it supports, the detection payload it
//! returns, the error taxonomy (transport failures are retryable,
//! validation failures are not), and the [`Recognizer`] trait that lets
//! the coordinator be exercised against a mock in tests.

use canvas::tolerance::ToleranceInfo;
use canvas::zone::BoundingBox;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by recognition client operations.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// The service base URL environment variable is not set.
    #[error("missing base URL: env var {var} not set")]
    MissingBaseUrl { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The network call failed or timed out.
    #[error("recognition request failed: {0}")]
    Transport(String),

    /// The service returned a non-success HTTP status.
    #[error("recognition response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body was received but is structurally invalid. Treated
    /// by callers as "no result", never retried.
    #[error("recognition response parse failed: {0}")]
    Parse(String),
}

impl RecognitionError {
    /// Whether a retry can help: transport failures and throttling/server
    /// statuses only. Validation failures and empty results never retry.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. }
        )
    }
}

// =============================================================================
// QUERY SHAPES
// =============================================================================

/// Speed/accuracy tier for whole-image detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectMode {
    /// Fastest, lowest accuracy.
    Fast,
    /// Middle tier.
    Balanced,
    /// Most accurate; used for initial detection.
    Accurate,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// A single detection as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    pub bbox: WireBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<WirePoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(rename = "textOrientation", default, skip_serializing_if = "Option::is_none")]
    pub text_orientation: Option<f64>,
    #[serde(rename = "toleranceInfo", default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<ToleranceInfo>,
    #[serde(rename = "isEmpty", default)]
    pub is_empty: bool,
}

/// Axis-aligned rectangle on the wire. Width/height are derived locally;
/// the service sends corners only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WireBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl WireBox {
    /// A degenerate box (zero or negative extent either way after
    /// normalization) is unusable for a zone.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        (self.x2 - self.x1).abs() < f64::EPSILON || (self.y2 - self.y1).abs() < f64::EPSILON
    }

    #[must_use]
    pub fn to_bounding_box(self) -> BoundingBox {
        BoundingBox::from_corners(self.x1, self.y1, self.x2, self.y2)
    }

    #[must_use]
    pub fn from_bounding_box(bbox: &BoundingBox) -> Self {
        Self { x1: bbox.x1, y1: bbox.y1, x2: bbox.x2, y2: bbox.y2 }
    }
}

/// A polygon vertex on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
}

/// Response to a whole-image query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectAllResponse {
    pub zones: Vec<Detection>,
    /// Free-form service metadata (model name, timing, ...). Carried
    /// through untouched.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

// =============================================================================
// RECOGNIZER TRAIT
// =============================================================================

/// Service-neutral async trait for the three recognition query shapes.
/// Enables mocking in coordinator tests.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Whole-image detection at the given speed/accuracy tier.
    ///
    /// # Errors
    ///
    /// Returns a [`RecognitionError`] on transport failure, non-success
    /// status, or a malformed response body.
    async fn detect_all(&self, image: &[u8], mode: DetectMode) -> Result<DetectAllResponse, RecognitionError>;

    /// Single best detection containing or nearest to `(x, y)`. `None`
    /// when the service finds nothing there.
    ///
    /// # Errors
    ///
    /// Returns a [`RecognitionError`] on transport failure, non-success
    /// status, or a malformed response body.
    async fn detect_at_point(&self, image: &[u8], x: f64, y: f64) -> Result<Option<Detection>, RecognitionError>;

    /// Detection scoped to an explicit sub-region, optionally with a
    /// rotation hint for the crop. `None` when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns a [`RecognitionError`] on transport failure, non-success
    /// status, or a malformed response body.
    async fn detect_in_rect(
        &self,
        image: &[u8],
        rect: WireBox,
        rotation: Option<f64>,
    ) -> Result<Option<Detection>, RecognitionError>;
}
