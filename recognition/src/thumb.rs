//! Thumbnail rasterization: cached base64 crops of zone pixels.
//!
//! A zone's `croppedImage` is a PNG crop of its bounding box, rotated by
//! the zone's quantized orientation so the thumbnail reads upright. The
//! store drops the cache whenever geometry changes; this module rebuilds
//! it from the session's source image.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageFormat;
use image::imageops;

use canvas::zone::BoundingBox;

use super::types::RecognitionError;

#[cfg(test)]
#[path = "thumb_test.rs"]
mod tests;

/// Decode the source image, crop to `bbox` (intersected with the image
/// bounds), rotate by the quantized `rotation_degrees`, and return the
/// result as a base64 PNG string.
///
/// # Errors
///
/// Returns [`RecognitionError::Parse`] when the source bytes do not decode
/// as an image or the crop region lies entirely outside it.
pub fn render_thumbnail(
    image_bytes: &[u8],
    bbox: &BoundingBox,
    rotation_degrees: f64,
) -> Result<String, RecognitionError> {
    let source = image::load_from_memory(image_bytes)
        .map_err(|e| RecognitionError::Parse(format!("source image decode failed: {e}")))?;

    let (region_x, region_y, region_w, region_h) =
        crop_region(bbox, f64::from(source.width()), f64::from(source.height()))
            .ok_or_else(|| RecognitionError::Parse("crop region outside image bounds".into()))?;

    let cropped = source.crop_imm(region_x, region_y, region_w, region_h);
    let rotated = match quantize_rotation(rotation_degrees) {
        90 => image::DynamicImage::ImageRgba8(imageops::rotate90(&cropped)),
        180 => image::DynamicImage::ImageRgba8(imageops::rotate180(&cropped)),
        270 => image::DynamicImage::ImageRgba8(imageops::rotate270(&cropped)),
        _ => cropped,
    };

    let mut png = Vec::new();
    rotated
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| RecognitionError::Parse(format!("thumbnail encode failed: {e}")))?;
    Ok(BASE64.encode(&png))
}

/// Snap an arbitrary angle to the nearest supported quarter turn.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn quantize_rotation(degrees: f64) -> u32 {
    let normalized = degrees.rem_euclid(360.0);
    let quarter = (normalized / 90.0).round() as u32 % 4;
    quarter * 90
}

/// Intersect the zone box with the image bounds and convert to integer
/// crop coordinates. `None` when the intersection is empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn crop_region(bbox: &BoundingBox, image_w: f64, image_h: f64) -> Option<(u32, u32, u32, u32)> {
    let x1 = bbox.x1.max(0.0).min(image_w);
    let y1 = bbox.y1.max(0.0).min(image_h);
    let x2 = bbox.x2.max(0.0).min(image_w);
    let y2 = bbox.y2.max(0.0).min(image_h);
    if x2 - x1 < 1.0 || y2 - y1 < 1.0 {
        return None;
    }
    let x = x1.floor() as u32;
    let y = y1.floor() as u32;
    let w = (x2 - x1).round() as u32;
    let h = (y2 - y1).round() as u32;
    Some((x, y, w, h))
}
