//! The normalized post model shared by every stage.
//!
//! Both export formats are parsed into [`Post`] values; the site generator,
//! the selector and the feed generator only ever see this representation.
//! Curation state is deliberately absent here: it lives in
//! [`Selection`](crate::selection::Selection), keyed by [`Post::id`].

use chrono::{DateTime, Datelike, Utc};
use std::path::PathBuf;

/// A single post from the export, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Timestamp-derived identifier, unique within one parse (`20250822-081800`).
    pub id: String,
    /// Creation time, always UTC.
    pub timestamp: DateTime<Utc>,
    /// Caption exactly as authored, hashtags left inline.
    pub caption: String,
    /// Hashtags in first-appearance order, without the leading `#`.
    pub hashtags: Vec<String>,
    /// Place name, or the formatted coordinates when no name is known.
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Resolved media in display order.
    pub media: Vec<MediaRef>,
    /// References from the export that did not resolve to a file.
    pub missing_media: Vec<String>,
}

impl Post {
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// First resolved media item, used for thumbnails and feed enclosures.
    pub fn primary_media(&self) -> Option<&MediaRef> {
        self.media.first()
    }

    /// Human-readable date used on pages and in CLI output (`Aug 22, 2025`).
    pub fn display_date(&self) -> String {
        self.timestamp.format("%b %d, %Y").to_string()
    }

    /// Relative URL of the post's detail page from the site root.
    pub fn page_path(&self) -> String {
        format!("posts/{}.html", self.id)
    }
}

/// Latitude/longitude pair as recorded by the camera or the app.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `"48.8584, 2.2945"`, used as a location label when no place name exists.
    pub fn label(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A media file referenced by a post that exists under the export root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Reference exactly as written in the export (`media/posts/202508/1.jpg`).
    pub uri: String,
    /// Absolute path of the file on disk.
    pub source: PathBuf,
    /// Path of the copy under the output `images/` dir; see [`site_path`].
    pub site_path: String,
    pub kind: MediaKind,
    pub mime: &'static str,
    /// File size in bytes (RSS enclosure length).
    pub bytes: u64,
}

/// Where a media reference is copied to, relative to the output `images/` dir.
///
/// The export's folders are kept so equal file names in different months
/// stay distinct; only a leading `media/` and `.` segments are dropped.
///
/// `media/posts/202508/1.jpg` → `posts/202508/1.jpg`
pub fn site_path(uri: &str) -> String {
    let segments: Vec<&str> = uri
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    match segments.split_first() {
        Some((&"media", rest)) if !rest.is_empty() => rest.join("/"),
        _ => segments.join("/"),
    }
}

/// Infer `(kind, mime)` from a file extension.
///
/// Unknown extensions map to `application/octet-stream` and are treated as images
/// so they still get copied and linked.
pub fn media_type(file_name: &str) -> (MediaKind, &'static str) {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => (MediaKind::Image, "image/jpeg"),
        "png" => (MediaKind::Image, "image/png"),
        "webp" => (MediaKind::Image, "image/webp"),
        "gif" => (MediaKind::Image, "image/gif"),
        "heic" => (MediaKind::Image, "image/heic"),
        "mp4" => (MediaKind::Video, "video/mp4"),
        "mov" => (MediaKind::Video, "video/quicktime"),
        "webm" => (MediaKind::Video, "video/webm"),
        _ => (MediaKind::Image, "application/octet-stream"),
    }
}
