//! Parameter types for image operations.
//!
//! These describe *what* to do; the [`backend`](super::backend) does the pixel
//! work. Tests swap in a mock backend without touching operation logic.

use std::path::PathBuf;

/// Lossy encoding quality, clamped to 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Unsharp-mask parameters.
///
/// - `sigma`: standard deviation of the blur (higher sharpens more)
/// - `threshold`: minimum brightness difference to sharpen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening, enough to offset the downscale blur on small thumbnails.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// A square crop written as JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Edge length of the square output in pixels.
    pub size: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}
