//! Export parsing and normalization.
//!
//! An export root contains the post records in one of two formats plus the
//! media files they reference:
//!
//! ```text
//! insta-export/
//! ├── your_instagram_activity/
//! │   └── media/
//! │       ├── posts_1.json        # JSON form (preferred)
//! │       └── posts_1.html        # markup form (fallback)
//! └── media/
//!     └── posts/
//!         └── 202508/
//!             ├── 17912345.jpg    # referenced as media/posts/202508/17912345.jpg
//!             └── 17912346.mp4
//! ```
//!
//! The format is detected once ([`ExportFormat::detect`]) and the matching
//! reader ([`json`] or [`markup`]) produces format-neutral [`RawRecord`]s.
//! Everything after that (hashtags, media resolution, ids, ordering) is shared,
//! so both formats normalize identically.
//!
//! Parsing is best-effort per record: a bad record or a missing media file is
//! reported as a [`ParseWarning`] and parsing continues. Only structural
//! problems (no export root, no records file, unreadable records file) are
//! errors.

pub mod json;
pub mod markup;
pub mod text;

use crate::types::{Coordinates, MediaRef, Post, media_type, site_path};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Records directory relative to the export root.
const RECORDS_DIR: &str = "your_instagram_activity/media";
const JSON_RECORDS: &str = "posts_1.json";
const MARKUP_RECORDS: &str = "posts_1.html";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Export directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("No posts_1.json or posts_1.html found under {0}")]
    FormatNotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a JSON array of posts: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Non-fatal problems found while parsing. The affected post is still emitted
/// (missing media) or just that record is dropped (malformed record).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseWarning {
    #[error("post {post}: media file not found: {uri}")]
    MissingMedia { post: String, uri: String },
    #[error("{path}: record #{index} skipped: {reason}", path = file.display())]
    MalformedRecord {
        file: PathBuf,
        index: usize,
        reason: String,
    },
}

/// The two supported record formats, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    Json(PathBuf),
    Markup(PathBuf),
}

impl ExportFormat {
    /// Detect the record format under `root`, preferring JSON.
    pub fn detect(root: &Path) -> Result<Self, ParseError> {
        if !root.is_dir() {
            return Err(ParseError::MissingRoot(root.to_path_buf()));
        }
        let dir = root.join(RECORDS_DIR);
        let json = dir.join(JSON_RECORDS);
        if json.is_file() {
            return Ok(Self::Json(json));
        }
        let markup = dir.join(MARKUP_RECORDS);
        if markup.is_file() {
            return Ok(Self::Markup(markup));
        }
        Err(ParseError::FormatNotFound(root.to_path_buf()))
    }

    pub fn records_file(&self) -> &Path {
        match self {
            Self::Json(path) | Self::Markup(path) => path,
        }
    }

    /// Read the records file and extract format-neutral records.
    fn read_records(&self) -> Result<RecordSet, ParseError> {
        let path = self.records_file();
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match self {
            Self::Json(path) => json::parse_records(path, &content),
            Self::Markup(path) => Ok(markup::parse_records(path, &content)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(_) => write!(f, "JSON"),
            Self::Markup(_) => write!(f, "HTML"),
        }
    }
}

/// One post as read from either format, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub caption: String,
    pub timestamp: DateTime<Utc>,
    pub media_uris: Vec<String>,
    pub coordinates: Option<Coordinates>,
    pub location_name: Option<String>,
}

/// Output of a format reader.
#[derive(Debug, Default)]
pub struct RecordSet {
    pub records: Vec<RawRecord>,
    pub warnings: Vec<ParseWarning>,
    /// Records with neither caption nor media, dropped without a warning.
    pub empty: usize,
}

/// Result of parsing an export.
#[derive(Debug)]
pub struct ParseReport {
    pub format: ExportFormat,
    /// Newest first, ties broken by id.
    pub posts: Vec<Post>,
    pub warnings: Vec<ParseWarning>,
    pub skipped_empty: usize,
}

/// Detect the format under `root` and produce the normalized post list.
pub fn parse_export(root: &Path) -> Result<ParseReport, ParseError> {
    let format = ExportFormat::detect(root)?;
    tracing::info!(format = %format, file = %format.records_file().display(), "parsing export");

    let RecordSet {
        records,
        mut warnings,
        empty,
    } = format.read_records()?;
    let posts = normalize(root, records, &mut warnings);

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    Ok(ParseReport {
        format,
        posts,
        warnings,
        skipped_empty: empty,
    })
}

/// Turn raw records into posts: resolve media, extract hashtags, assign ids, sort.
pub fn normalize(root: &Path, records: Vec<RawRecord>, warnings: &mut Vec<ParseWarning>) -> Vec<Post> {
    let ids = assign_ids(&records);
    let mut posts: Vec<Post> = records
        .into_iter()
        .zip(ids)
        .map(|(record, id)| {
            let mut media = Vec::new();
            let mut missing_media = Vec::new();
            for uri in record.media_uris {
                match resolve_media(root, &uri) {
                    Some(m) => media.push(m),
                    None => {
                        warnings.push(ParseWarning::MissingMedia {
                            post: id.clone(),
                            uri: uri.clone(),
                        });
                        missing_media.push(uri);
                    }
                }
            }
            let location = record
                .location_name
                .or_else(|| record.coordinates.map(|c| c.label()));
            Post {
                hashtags: text::extract_hashtags(&record.caption),
                id,
                timestamp: record.timestamp,
                caption: record.caption,
                location,
                coordinates: record.coordinates,
                media,
                missing_media,
            }
        })
        .collect();

    sort_newest_first(&mut posts);
    posts
}

/// Newest first; equal timestamps ordered by id so output is deterministic.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(newest_first);
}

/// Ordering used everywhere posts are listed: timestamp descending, then id.
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}

/// Resolve a relative media reference to an existing file under `root`.
///
/// Absolute references and references containing `..` never resolve.
fn resolve_media(root: &Path, uri: &str) -> Option<MediaRef> {
    let rel = Path::new(uri);
    let contained = rel
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if uri.is_empty() || !contained {
        return None;
    }
    let source = root.join(rel);
    let metadata = fs::metadata(&source).ok().filter(|m| m.is_file())?;
    let (kind, mime) = media_type(&source.file_name()?.to_string_lossy());
    Some(MediaRef {
        uri: uri.to_string(),
        source,
        site_path: site_path(uri),
        kind,
        mime,
        bytes: metadata.len(),
    })
}

/// Derive ids from timestamps (`20250822-081800`).
///
/// Posts sharing a second get a short content digest appended so ids do not
/// depend on record order; identical content falls back to a counter.
fn assign_ids(records: &[RawRecord]) -> Vec<String> {
    let bases: Vec<String> = records
        .iter()
        .map(|r| r.timestamp.format("%Y%m%d-%H%M%S").to_string())
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for base in &bases {
        *counts.entry(base.as_str()).or_default() += 1;
    }

    let mut taken = HashSet::new();
    records
        .iter()
        .zip(&bases)
        .map(|(record, base)| {
            let candidate = if counts[base.as_str()] > 1 {
                format!("{base}-{}", content_digest(record))
            } else {
                base.clone()
            };
            let mut id = candidate.clone();
            let mut n = 2;
            while !taken.insert(id.clone()) {
                id = format!("{candidate}-{n}");
                n += 1;
            }
            id
        })
        .collect()
}

/// First 8 hex chars of SHA-256 over the media references and caption.
fn content_digest(record: &RawRecord) -> String {
    let mut hasher = Sha256::new();
    for uri in &record.media_uris {
        hasher.update(uri.as_bytes());
        hasher.update(b"\0");
    }
    hasher.update(record.caption.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}
