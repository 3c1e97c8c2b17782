//! Pure Rust backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate decoders |
//! | Fill + crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Sharpening | `image::imageops::unsharpen` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! HEIC and video sources are not decodable here; callers fall back to the
//! original file when [`ImageBackend::thumbnail`] fails.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// JPEG has no alpha channel, so everything is flattened to RGB8 first.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality as u8);
    rgb.write_with_encoder(encoder).map_err(|e| {
        BackendError::ProcessingFailed(format!("JPEG encode failed for {}: {}", path.display(), e))
    })?;
    writer.flush().map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let filled = img.resize_to_fill(params.size, params.size, FilterType::Lanczos3);
        let final_img = match params.sharpening {
            Some(s) => DynamicImage::from(image::imageops::unsharpen(&filled, s.sigma, s.threshold)),
            None => filled,
        };
        save_jpeg(&final_img, &params.output, params.quality.value())
    }
}
