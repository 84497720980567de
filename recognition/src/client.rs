//! HTTP recognition client.
//!
//! Thin reqwest wrapper over the three service endpoints. Pure parsing in
//! `parse_detect_all` / `parse_single` for testability; the HTTP layer only
//! moves bytes and classifies statuses. Structurally unusable detections
//! (degenerate boxes) are dropped at parse time as "no result" rather than
//! surfaced as errors.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::config::RecognizerConfig;
use super::types::{DetectAllResponse, DetectMode, Detection, RecognitionError, Recognizer, WireBox};

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

const DETECT_PATH: &str = "/v1/detect";
const DETECT_POINT_PATH: &str = "/v1/detect/point";
const DETECT_RECT_PATH: &str = "/v1/detect/rect";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpRecognizer {
    http: reqwest::Client,
    config: RecognizerConfig,
}

impl HttpRecognizer {
    /// Build a recognizer over the given config.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::ClientBuild`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RecognitionError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Build a recognizer configured from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is missing or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Self, RecognitionError> {
        Self::new(RecognizerConfig::from_env()?)
    }

    /// Configured retry attempts for transient failures.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    /// Configured fixed delay between retry attempts.
    #[must_use]
    pub fn retry_delay(&self) -> std::time::Duration {
        self.config.retry_delay
    }

    async fn post(&self, path: &str, body: &impl serde::Serialize) -> Result<String, RecognitionError> {
        let url = format!("{}{path}", self.config.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(RecognitionError::Status { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl Recognizer for HttpRecognizer {
    async fn detect_all(&self, image: &[u8], mode: DetectMode) -> Result<DetectAllResponse, RecognitionError> {
        let body = DetectAllRequest { image: BASE64.encode(image), mode };
        let text = self.post(DETECT_PATH, &body).await?;
        parse_detect_all(&text)
    }

    async fn detect_at_point(&self, image: &[u8], x: f64, y: f64) -> Result<Option<Detection>, RecognitionError> {
        let body = DetectPointRequest { image: BASE64.encode(image), x, y };
        let text = self.post(DETECT_POINT_PATH, &body).await?;
        parse_single(&text)
    }

    async fn detect_in_rect(
        &self,
        image: &[u8],
        rect: WireBox,
        rotation: Option<f64>,
    ) -> Result<Option<Detection>, RecognitionError> {
        let body = DetectRectRequest { image: BASE64.encode(image), rect, rotation };
        let text = self.post(DETECT_RECT_PATH, &body).await?;
        parse_single(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct DetectAllRequest {
    image: String,
    mode: DetectMode,
}

#[derive(serde::Serialize)]
struct DetectPointRequest {
    image: String,
    x: f64,
    y: f64,
}

#[derive(serde::Serialize)]
struct DetectRectRequest {
    image: String,
    rect: WireBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct SingleResponse {
    #[serde(default)]
    zone: Option<Detection>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_detect_all(json: &str) -> Result<DetectAllResponse, RecognitionError> {
    let mut response: DetectAllResponse =
        serde_json::from_str(json).map_err(|e| RecognitionError::Parse(e.to_string()))?;
    response.zones.retain(usable);
    Ok(response)
}

fn parse_single(json: &str) -> Result<Option<Detection>, RecognitionError> {
    let response: SingleResponse = serde_json::from_str(json).map_err(|e| RecognitionError::Parse(e.to_string()))?;
    Ok(response.zone.filter(usable))
}

/// A detection whose box has no extent cannot anchor a zone.
fn usable(detection: &Detection) -> bool {
    !detection.bbox.is_degenerate()
}
