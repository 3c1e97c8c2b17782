//! High-level image operations: decide names and parameters, then call the backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, Sharpening, ThumbnailParams};
use std::path::Path;

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Square edge length in pixels.
    pub size: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 400,
            quality: Quality::default(),
            sharpening: Some(Sharpening::light()),
        }
    }
}

impl From<&crate::config::ThumbnailsConfig> for ThumbnailConfig {
    fn from(config: &crate::config::ThumbnailsConfig) -> Self {
        Self {
            size: config.size,
            quality: Quality::new(config.quality),
            ..Self::default()
        }
    }
}

/// Thumbnail path for a media file's site path, relative to the thumbs dir.
///
/// `.jpg` sources keep their path; anything else gets `.jpg` appended, so
/// `a.jpg` and `a.png` in the same folder get distinct thumbnails.
///
/// `posts/202508/1.png` → `posts/202508/1.png.jpg`
pub fn thumbnail_name(site_path: &str) -> String {
    if site_path.ends_with(".jpg") {
        site_path.to_string()
    } else {
        format!("{site_path}.jpg")
    }
}

pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        size: config.size,
        quality: config.quality,
        sharpening: config.sharpening,
    }
}

/// Write a square thumbnail of `source` into `thumbs_dir`. The directory for
/// [`thumbnail_name`] must already exist.
///
/// The edge is the configured size, or the source's shorter side if that is
/// smaller; thumbnails are never upscaled. Returns the thumbnail's file name.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    thumbs_dir: &Path,
    site_path: &str,
    config: &ThumbnailConfig,
) -> Result<String> {
    let dims = backend.identify(source)?;
    let name = thumbnail_name(site_path);
    let mut params = plan_thumbnail(source, &thumbs_dir.join(&name), config);
    params.size = params.size.min(dims.width).min(dims.height).max(1);
    backend.thumbnail(&params)?;
    Ok(name)
}
