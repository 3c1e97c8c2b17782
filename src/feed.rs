//! RSS 2.0 feed of the selected posts.
//!
//! The feed is what an RSS importer (a newsletter platform, a reader) consumes,
//! so it carries absolute URLs built from `base_url` and only the posts the
//! operator selected. Unselected and undecided posts never appear.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">
//!   <channel>
//!     <title>Instagram Archive</title>
//!     <link>https://example.com/</link>
//!     <description>Posts from Instagram export</description>
//!     <language>en</language>
//!     <generator>gramfeed 0.3.0</generator>
//!     <lastBuildDate>Fri, 22 Aug 2025 08:18:00 +0000</lastBuildDate>
//!     <atom:link href="https://example.com/feed.xml" rel="self" type="application/rss+xml"></atom:link>
//!     <item>
//!       <title>Sunset at the beach</title>
//!       <link>https://example.com/posts/20250822-081800.html</link>
//!       <guid isPermaLink="true">https://example.com/posts/20250822-081800.html</guid>
//!       <pubDate>Fri, 22 Aug 2025 08:18:00 +0000</pubDate>
//!       <description>Sunset at the beach #travel</description>
//!       <content:encoded>&lt;p&gt;Sunset at the beach #travel&lt;/p&gt;…</content:encoded>
//!       <category>travel</category>
//!       <enclosure url="https://example.com/images/posts/202508/17912345.jpg" type="image/jpeg" length="48213"></enclosure>
//!     </item>
//!   </channel>
//! </rss>
//! ```
//!
//! Rendering goes through maud, which escapes `&`, `<`, `>` and `"` and passes
//! every other character through, so accented text and emoji stay literal.
//! Empty elements are written with an explicit end tag because maud's void
//! syntax produces HTML-style `<tag>` rather than `<tag/>`.
//!
//! `lastBuildDate` is the newest selected post's timestamp rather than the
//! wall clock, so regenerating from the same inputs gives identical bytes.

use crate::config::SiteConfig;
use crate::export::newest_first;
use crate::export::text::{title_text, truncate_title};
use crate::selection::Selection;
use crate::types::{MediaKind, Post};
use chrono::{DateTime, Utc};
use maud::{Markup, PreEscaped, html};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FEED_FILENAME: &str = "feed.xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error writing feed {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// RFC 822 date as RSS expects it, always in UTC.
pub fn rfc822(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Item title: caption without hashtags, truncated; a dated fallback when
/// nothing is left.
pub fn item_title(post: &Post, max_chars: usize) -> String {
    let text = title_text(&post.caption);
    if text.is_empty() {
        format!("Post from {}", post.display_date())
    } else {
        truncate_title(&text, max_chars)
    }
}

/// Drop characters XML 1.0 does not allow: C0 controls other than tab, LF
/// and CR, and the noncharacters U+FFFE and U+FFFF.
fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c >= ' ' || matches!(c, '\t' | '\n' | '\r'))
        .filter(|c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect()
}

/// Render the feed document for the selected subset of `posts`.
pub fn render_feed(posts: &[Post], selection: &Selection, config: &SiteConfig) -> String {
    let mut selected = selection.filter(posts);
    selected.sort_by(|a, b| newest_first(a, b));

    let base = config.base_url();
    let last_build = selected.iter().map(|p| p.timestamp).max();

    let doc = html! {
        (PreEscaped(XML_DECLARATION))
        rss version="2.0" xmlns:atom=(ATOM_NS) xmlns:content=(CONTENT_NS) {
            channel {
                title { (xml_text(&config.feed.title)) }
                link { (base) "/" }
                description { (xml_text(&config.feed.description)) }
                language { (config.feed.language) }
                generator { "gramfeed " (env!("CARGO_PKG_VERSION")) }
                @if let Some(ts) = last_build {
                    lastBuildDate { (rfc822(&ts)) }
                }
                atom:link href={ (base) "/" (FEED_FILENAME) } rel="self" type="application/rss+xml" {}
                @for post in &selected {
                    (render_item(post, base, config.feed.title_max_chars))
                }
            }
        }
    };
    let mut xml = doc.into_string();
    xml.push('\n');
    xml
}

fn render_item(post: &Post, base: &str, title_max_chars: usize) -> Markup {
    let url = format!("{base}/{}", post.page_path());
    html! {
        item {
            title { (xml_text(&item_title(post, title_max_chars))) }
            link { (url) }
            guid isPermaLink="true" { (url) }
            pubDate { (rfc822(&post.timestamp)) }
            description { (xml_text(&post.caption)) }
            content:encoded { (render_content(post, base).into_string()) }
            @for tag in &post.hashtags {
                category { (xml_text(tag)) }
            }
            @if let Some(media) = post.primary_media() {
                enclosure url={ (base) "/images/" (media.site_path) } type=(media.mime) length=(media.bytes) {}
            }
        }
    }
}

/// HTML body for `content:encoded`: caption, tags, every media item, location.
fn render_content(post: &Post, base: &str) -> Markup {
    html! {
        @if !post.caption.is_empty() {
            p { (xml_text(&post.caption)) }
        }
        @if !post.hashtags.is_empty() {
            p {
                @for (i, tag) in post.hashtags.iter().enumerate() {
                    @if i > 0 { " " }
                    "#" (xml_text(tag))
                }
            }
        }
        @for media in &post.media {
            @match media.kind {
                MediaKind::Image => {
                    p { img src={ (base) "/images/" (media.site_path) } alt=""; }
                }
                MediaKind::Video => {
                    p { video src={ (base) "/images/" (media.site_path) } controls {} }
                }
            }
        }
        @if let Some(location) = &post.location {
            p { "Location: " (xml_text(location)) }
        }
    }
}

/// Render and write `feed.xml` into `output_dir`. Returns the item count.
pub fn write_feed(
    posts: &[Post],
    selection: &Selection,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<usize, FeedError> {
    let path = output_dir.join(FEED_FILENAME);
    let io_err = |source: io::Error| FeedError::Io {
        path: path.clone(),
        source,
    };
    let xml = render_feed(posts, selection, config);
    fs::create_dir_all(output_dir).map_err(io_err)?;
    let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
    writer.write_all(xml.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    let count = posts.iter().filter(|p| selection.is_selected(&p.id)).count();
    tracing::info!(items = count, path = %path.display(), "wrote feed");
    Ok(count)
}
