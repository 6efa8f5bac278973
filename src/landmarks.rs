//! Per-frame inputs handed over by the external landmark detector.

use serde::{Deserialize, Serialize};

/// One facial landmark in normalized image coordinates (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale to pixel coordinates for the given frame
    #[must_use]
    pub fn to_pixels(self, frame: FrameShape) -> (f64, f64) {
        (self.x * frame.width, self.y * frame.height)
    }
}

/// Pixel dimensions of the frame the landmarks were detected in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameShape {
    pub width: f64,
    pub height: f64,
}

impl FrameShape {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for FrameShape {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}
