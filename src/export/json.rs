//! Reader for `posts_1.json`.
//!
//! The file is a JSON array with one object per post:
//!
//! ```json
//! [{
//!   "title": "Sunset ð\u009f\u008c\u0085 #travel",
//!   "creation_timestamp": 1755850680,
//!   "media": [{
//!     "uri": "media/posts/202508/17912345.jpg",
//!     "creation_timestamp": 1755850680,
//!     "title": "",
//!     "media_metadata": {
//!       "photo_metadata": { "exif_data": [{ "latitude": 38.7, "longitude": -9.1 }] }
//!     }
//!   }]
//! }]
//! ```
//!
//! Text fields carry UTF-8 bytes escaped one per code point and are repaired
//! with [`fix_encoding`](super::text::fix_encoding). Single-media posts often
//! have no post-level `title`/`creation_timestamp`; both fall back to the
//! first media item.

use super::text::fix_encoding;
use super::{ParseError, ParseWarning, RawRecord, RecordSet};
use crate::types::Coordinates;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct JsonPost {
    #[serde(default)]
    title: String,
    creation_timestamp: Option<i64>,
    #[serde(default)]
    media: Vec<JsonMedia>,
    /// Place name; only present in some export revisions.
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonMedia {
    #[serde(default)]
    uri: String,
    creation_timestamp: Option<i64>,
    #[serde(default)]
    title: String,
    media_metadata: Option<MediaMetadata>,
}

#[derive(Debug, Deserialize)]
struct MediaMetadata {
    photo_metadata: Option<PhotoMetadata>,
}

#[derive(Debug, Deserialize)]
struct PhotoMetadata {
    #[serde(default)]
    exif_data: Vec<ExifEntry>,
}

#[derive(Debug, Deserialize)]
struct ExifEntry {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Parse the records file. Only a non-array top level is an error; each
/// element that fails to deserialize becomes a warning.
pub fn parse_records(path: &Path, content: &str) -> Result<RecordSet, ParseError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut set = RecordSet::default();
    for (index, value) in values.into_iter().enumerate() {
        let malformed = |reason: String| ParseWarning::MalformedRecord {
            file: path.to_path_buf(),
            index,
            reason,
        };
        let post: JsonPost = match serde_json::from_value(value) {
            Ok(post) => post,
            Err(e) => {
                set.warnings.push(malformed(e.to_string()));
                continue;
            }
        };
        match convert(post) {
            Ok(Some(record)) => set.records.push(record),
            Ok(None) => set.empty += 1,
            Err(reason) => set.warnings.push(malformed(reason)),
        }
    }
    Ok(set)
}

/// `Ok(None)` for an empty post (no caption, no media).
fn convert(post: JsonPost) -> Result<Option<RawRecord>, String> {
    let caption = if post.title.is_empty() {
        post.media
            .iter()
            .map(|m| m.title.as_str())
            .find(|t| !t.is_empty())
            .unwrap_or_default()
            .to_string()
    } else {
        post.title.clone()
    };
    let caption = fix_encoding(&caption);

    let media_uris: Vec<String> = post
        .media
        .iter()
        .map(|m| m.uri.clone())
        .filter(|uri| !uri.is_empty())
        .collect();

    if caption.trim().is_empty() && media_uris.is_empty() {
        return Ok(None);
    }

    let seconds = post
        .creation_timestamp
        .filter(|ts| *ts > 0)
        .or_else(|| {
            post.media
                .first()
                .and_then(|m| m.creation_timestamp)
                .filter(|ts| *ts > 0)
        })
        .ok_or_else(|| "no creation_timestamp".to_string())?;
    let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("creation_timestamp out of range: {seconds}"))?;

    Ok(Some(RawRecord {
        caption,
        timestamp,
        media_uris,
        coordinates: coordinates(&post.media),
        location_name: post
            .location
            .map(|l| fix_encoding(l.trim()))
            .filter(|l| !l.is_empty()),
    }))
}

/// First latitude and first longitude found across all media EXIF entries.
fn coordinates(media: &[JsonMedia]) -> Option<Coordinates> {
    let exif = media
        .iter()
        .filter_map(|m| m.media_metadata.as_ref())
        .filter_map(|m| m.photo_metadata.as_ref())
        .flat_map(|p| p.exif_data.iter());
    let mut latitude = None;
    let mut longitude = None;
    for entry in exif {
        latitude = latitude.or(entry.latitude.filter(|v| *v != 0.0));
        longitude = longitude.or(entry.longitude.filter(|v| *v != 0.0));
    }
    Some(Coordinates {
        latitude: latitude?,
        longitude: longitude?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(content: &str) -> RecordSet {
        parse_records(Path::new("posts_1.json"), content).unwrap()
    }

    #[test]
    fn parses_basic_post() {
        let set = parse(
            r#"[{
                "title": "Hello #world",
                "creation_timestamp": 1755850680,
                "media": [{"uri": "media/posts/1.jpg"}, {"uri": "media/posts/2.jpg"}]
            }]"#,
        );
        assert_eq!(set.records.len(), 1);
        let r = &set.records[0];
        assert_eq!(r.caption, "Hello #world");
        assert_eq!(r.timestamp, Utc.with_ymd_and_hms(2025, 8, 22, 8, 18, 0).unwrap());
        assert_eq!(r.media_uris, vec!["media/posts/1.jpg", "media/posts/2.jpg"]);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn falls_back_to_media_title_and_timestamp() {
        let set = parse(
            r#"[{
                "media": [{"uri": "m/1.jpg", "title": "From media", "creation_timestamp": 1700000000}]
            }]"#,
        );
        let r = &set.records[0];
        assert_eq!(r.caption, "From media");
        assert_eq!(r.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn repairs_double_encoded_caption() {
        // "café 😀" written one byte per \u00XX escape
        let set = parse(
            r#"[{"title": "cafÃ© ð\u009f\u0098\u0080", "creation_timestamp": 1, "media": []}]"#,
        );
        assert_eq!(set.records[0].caption, "café 😀");
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let set = parse(
            r#"[
                {"title": "ok", "creation_timestamp": 10, "media": []},
                {"title": 42, "media": []},
                {"title": "no time", "media": [{"uri": "m/1.jpg"}]},
                {"title": "also ok", "creation_timestamp": 20, "media": []}
            ]"#,
        );
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.warnings.len(), 2);
        match &set.warnings[1] {
            ParseWarning::MalformedRecord { index, reason, .. } => {
                assert_eq!(*index, 2);
                assert!(reason.contains("creation_timestamp"));
            }
            other => panic!("unexpected warning {other:?}"),
        }
        assert!(set.warnings[0].to_string().contains("posts_1.json: record #1"));
    }

    #[test]
    fn empty_posts_are_counted_not_warned() {
        let set = parse(r#"[{"title": "", "creation_timestamp": 10, "media": [{"uri": ""}]}]"#);
        assert!(set.records.is_empty());
        assert!(set.warnings.is_empty());
        assert_eq!(set.empty, 1);
    }

    #[test]
    fn non_array_is_structural_error() {
        let result = parse_records(Path::new("posts_1.json"), r#"{"posts": []}"#);
        assert!(matches!(result, Err(ParseError::Json { .. })));
    }

    #[test]
    fn extracts_first_coordinates() {
        let set = parse(
            r#"[{
                "title": "geo", "creation_timestamp": 5,
                "media": [
                    {"uri": "a.jpg", "media_metadata": {"photo_metadata": {"exif_data": [{"latitude": 38.7}, {"longitude": -9.1}]}}},
                    {"uri": "b.jpg", "media_metadata": {"photo_metadata": {"exif_data": [{"latitude": 1.0, "longitude": 1.0}]}}}
                ]
            }]"#,
        );
        let c = set.records[0].coordinates.unwrap();
        assert_eq!(c.latitude, 38.7);
        assert_eq!(c.longitude, -9.1);
    }

    #[test]
    fn location_name_when_present() {
        let set = parse(r#"[{"title": "x", "creation_timestamp": 5, "location": " Porto "}]"#);
        assert_eq!(set.records[0].location_name.as_deref(), Some("Porto"));
        assert!(set.records[0].coordinates.is_none());
    }
}
