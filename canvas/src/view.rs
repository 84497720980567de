#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use serde::{Deserialize, Serialize};

/// A point in either screen (CSS pixel) or image (raster pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mapping between the canvas's displayed (CSS) size and its internal
/// raster size in image pixels.
///
/// All hit-testing happens in image space, so the conversion is an exact
/// linear scale with no rounding. A degenerate CSS size maps to scale 1.0.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Canvas raster width in image pixels.
    pub image_width: f64,
    /// Canvas raster height in image pixels.
    pub image_height: f64,
    /// Displayed CSS width of the canvas element.
    pub css_width: f64,
    /// Displayed CSS height of the canvas element.
    pub css_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { image_width: 0.0, image_height: 0.0, css_width: 0.0, css_height: 0.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(image_width: f64, image_height: f64, css_width: f64, css_height: f64) -> Self {
        Self { image_width, image_height, css_width, css_height }
    }

    fn scale_x(&self) -> f64 {
        if self.css_width > 0.0 { self.image_width / self.css_width } else { 1.0 }
    }

    fn scale_y(&self) -> f64 {
        if self.css_height > 0.0 { self.image_height / self.css_height } else { 1.0 }
    }

    /// Convert a pointer position in CSS pixels to image coordinates.
    #[must_use]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point { x: screen.x * self.scale_x(), y: screen.y * self.scale_y() }
    }

    /// Convert an image-space point back to CSS pixels.
    #[must_use]
    pub fn image_to_screen(&self, image: Point) -> Point {
        let sx = self.scale_x();
        let sy = self.scale_y();
        Point {
            x: if sx > 0.0 { image.x / sx } else { image.x },
            y: if sy > 0.0 { image.y / sy } else { image.y },
        }
    }
}
