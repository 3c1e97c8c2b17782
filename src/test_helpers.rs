//! Shared test utilities.
//!
//! Builders for export trees on disk (both record formats plus media files)
//! and for in-memory [`Post`] values.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_media(tmp.path(), "media/posts/1.jpg", b"jpeg");
//! write_json_export(tmp.path(), r#"[{"title": "hi", "creation_timestamp": 1,
//!     "media": [{"uri": "media/posts/1.jpg"}]}]"#);
//!
//! let report = parse_export(tmp.path()).unwrap();
//! let post = find_post(&report.posts, "19700101-000001");
//! ```

use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::export::text::extract_hashtags;
use crate::types::{MediaRef, Post, media_type, site_path};

// =========================================================================
// Export trees
// =========================================================================

const RECORDS_DIR: &str = "your_instagram_activity/media";

/// Write `posts_1.json` under `root` with the given content.
pub fn write_json_export(root: &Path, content: &str) {
    let dir = root.join(RECORDS_DIR);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("posts_1.json"), content).unwrap();
}

/// Write `posts_1.html` under `root` with the given content.
pub fn write_markup_export(root: &Path, content: &str) {
    let dir = root.join(RECORDS_DIR);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("posts_1.html"), content).unwrap();
}

/// Write a media file at `rel` under `root`, creating parent directories.
pub fn write_media(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Write a small gradient JPEG, decodable by the thumbnail backend.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// One post block as the markup export renders it.
///
/// `caption_html` is inserted raw so tests can exercise entity decoding.
/// Files ending in `.mp4` become `<video>` elements, everything else `<img>`.
pub fn markup_post(
    caption_html: &str,
    date: &str,
    media: &[&str],
    coords: Option<(f64, f64)>,
) -> String {
    let mut html = String::from(r#"<div class="pam _3-95 _2ph- _a6-g uiBoxWhite noborder">"#);
    html.push_str(&format!(r#"<h2 class="_3-95 _2pim _a6-h _a6-i">{caption_html}</h2>"#));
    html.push_str(r#"<div class="_3-95 _a6-p"><div>"#);
    for src in media {
        if src.ends_with(".mp4") {
            html.push_str(&format!(r#"<video src="{src}" class="_a6_o _3-96"></video>"#));
        } else {
            html.push_str(&format!(r#"<img src="{src}" class="_a6_o _3-96">"#));
        }
    }
    if let Some((lat, lon)) = coords {
        html.push_str("<table>");
        for (label, value) in [("Latitude", lat), ("Longitude", lon)] {
            html.push_str(&format!(
                r#"<tr><td class="_2pin"><div class="_a6-q">{label}</div></td><td class="_2pin"><div class="_a6-q">{value}</div></td></tr>"#
            ));
        }
        html.push_str("</table>");
    }
    html.push_str("</div></div>");
    html.push_str(&format!(r#"<div class="_3-94 _a6-o">{date}</div>"#));
    html.push_str("</div>");
    html
}

/// A temp export with three JSON posts and real JPEG media:
///
/// | id | caption | media |
/// |---|---|---|
/// | `20250822-081800` | `Sunset <3 & "friends" #travel #beach` | `media/posts/202508/sunset.jpg` |
/// | `20240102-100000` | `Café 😀 #food` | `media/posts/202401/cafe.jpg`, `media/posts/202401/clip.mp4` |
/// | `20230515-120000` | `No tags here` | `media/posts/202305/gone.jpg` (missing) |
pub fn setup_export() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_test_jpeg(&root.join("media/posts/202508/sunset.jpg"), 64, 48);
    write_test_jpeg(&root.join("media/posts/202401/cafe.jpg"), 48, 64);
    write_media(root, "media/posts/202401/clip.mp4", b"not really a video");
    write_json_export(
        root,
        r#"[
            {
                "title": "Sunset <3 & \"friends\" #travel #beach",
                "creation_timestamp": 1755850680,
                "media": [{"uri": "media/posts/202508/sunset.jpg"}]
            },
            {
                "title": "CafÃ© ð\u009f\u0098\u0080 #food",
                "creation_timestamp": 1704189600,
                "media": [
                    {"uri": "media/posts/202401/cafe.jpg"},
                    {"uri": "media/posts/202401/clip.mp4"}
                ],
                "location": "Lisbon"
            },
            {
                "title": "No tags here",
                "creation_timestamp": 1684152000,
                "media": [{"uri": "media/posts/202305/gone.jpg"}]
            }
        ]"#,
    );
    tmp
}

// =========================================================================
// In-memory posts
// =========================================================================

/// A post with no media, id derived from `secs` the same way the parser does.
pub fn sample_post(secs: i64, caption: &str) -> Post {
    let timestamp = Utc.timestamp_opt(secs, 0).unwrap();
    Post {
        id: timestamp.format("%Y%m%d-%H%M%S").to_string(),
        timestamp,
        caption: caption.to_string(),
        hashtags: extract_hashtags(caption),
        location: None,
        coordinates: None,
        media: vec![],
        missing_media: vec![],
    }
}

/// A [`MediaRef`] for a file that is not expected to exist on disk.
pub fn sample_media(uri: &str, bytes: u64) -> MediaRef {
    let (kind, mime) = media_type(uri);
    MediaRef {
        uri: uri.to_string(),
        source: Path::new("/export").join(uri),
        site_path: site_path(uri),
        kind,
        mime,
        bytes,
    }
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a post by id. Panics with the available ids if not found.
pub fn find_post<'a>(posts: &'a [Post], id: &str) -> &'a Post {
    posts.iter().find(|p| p.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        panic!("post '{id}' not found. Available: {ids:?}")
    })
}
