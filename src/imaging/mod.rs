//! Listing thumbnails, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | `resize_to_fill` + `unsharpen` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Parameters**: data structures describing an operation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: what to create, where, at which size

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{ThumbnailConfig, create_thumbnail, thumbnail_name};
pub use params::{Quality, Sharpening};
pub use rust_backend::RustBackend;
