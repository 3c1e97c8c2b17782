//! Image backend trait and shared types.
//!
//! The production implementation is [`RustBackend`](super::rust_backend::RustBackend);
//! tests use the recording [`MockBackend`](tests::MockBackend).

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

pub trait ImageBackend {
    /// Read image dimensions without a full decode where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize to cover a square, center-crop and encode as JPEG.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
