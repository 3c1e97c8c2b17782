//! Static site generation.
//!
//! Renders every parsed post, selected or not, into a self-contained site:
//!
//! ```text
//! site/
//! ├── index.html                 # listing, newest first
//! ├── style.css                  # color variables + static/style.css
//! ├── feed.xml                   # written by the feed module
//! ├── posts/
//! │   └── 20250822-081800.html   # one page per post, with newer/older links
//! └── images/
//!     ├── posts/202508/
//!     │   ├── 17912345.jpg       # media copied verbatim, export folders kept
//!     │   └── 17912346.mp4
//!     └── thumbs/posts/202508/
//!         └── 17912345.jpg       # square listing thumbnail
//! ```
//!
//! The `posts/` and `images/` subtrees are rebuilt from scratch on every run;
//! anything else in the output directory (the feed, the selection file if it
//! lives there) is left alone.
//!
//! Thumbnails are made from the first media item of each post. When that item
//! is a video, or cannot be decoded (HEIC, a truncated file), the listing uses
//! the copied original instead and the failure is logged, never fatal.
//!
//! Output depends only on the posts and the config, so running twice over the
//! same export produces byte-identical files.

use crate::config::{self, SiteConfig};
use crate::feed::{FEED_FILENAME, item_title};
use crate::imaging::{ImageBackend, ThumbnailConfig, create_thumbnail, thumbnail_name};
use crate::types::{MediaKind, MediaRef, Post};
use maud::{DOCTYPE, Markup, html};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const STYLESHEET: &str = "style.css";
const POSTS_DIR: &str = "posts";
const IMAGES_DIR: &str = "images";
const THUMBS_DIR: &str = "thumbs";

/// What the generator wrote, for the CLI summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub output_dir: PathBuf,
    pub pages: usize,
    pub media_copied: usize,
    pub thumbnails: usize,
    /// Posts whose listing image is the original file.
    pub thumbnail_fallbacks: usize,
    pub missing_media: usize,
}

/// Listing image for one post, as a path relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Preview {
    Thumbnail(String),
    Original(String),
    Video(String),
    None,
}

fn io_error(path: &Path) -> impl Fn(io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(io_error(path))
}

fn create_parent(path: &Path) -> Result<(), GenerateError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(io_error(parent)),
        None => Ok(()),
    }
}

/// Remove and recreate a generated subtree.
fn reset_dir(path: &Path) -> Result<(), GenerateError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(io_error(path))?;
    }
    fs::create_dir_all(path).map_err(io_error(path))
}

/// Render the whole site for `posts` (expected newest first) into `output_dir`.
pub fn generate(
    posts: &[Post],
    config: &SiteConfig,
    output_dir: &Path,
    backend: &impl ImageBackend,
) -> Result<GenerateSummary, GenerateError> {
    let posts_dir = output_dir.join(POSTS_DIR);
    let images_dir = output_dir.join(IMAGES_DIR);
    let thumbs_dir = images_dir.join(THUMBS_DIR);
    fs::create_dir_all(output_dir).map_err(io_error(output_dir))?;
    reset_dir(&posts_dir)?;
    reset_dir(&images_dir)?;
    fs::create_dir_all(&thumbs_dir).map_err(io_error(&thumbs_dir))?;

    let mut summary = GenerateSummary {
        output_dir: output_dir.to_path_buf(),
        ..GenerateSummary::default()
    };

    for media in posts.iter().flat_map(|p| &p.media) {
        let dest = images_dir.join(&media.site_path);
        create_parent(&dest)?;
        fs::copy(&media.source, &dest).map_err(io_error(&media.source))?;
        summary.media_copied += 1;
    }
    summary.missing_media = posts.iter().map(|p| p.missing_media.len()).sum();

    let thumb_config = ThumbnailConfig::from(&config.thumbnails);
    let previews: Vec<Preview> = posts
        .iter()
        .map(|post| {
            let preview = listing_preview(post, backend, &thumbs_dir, &thumb_config);
            match &preview {
                Preview::Thumbnail(_) => summary.thumbnails += 1,
                Preview::Original(_) | Preview::Video(_) => summary.thumbnail_fallbacks += 1,
                Preview::None => {}
            }
            preview
        })
        .collect();

    let css = format!("{}\n\n{}", config::generate_color_css(&config.colors), CSS_STATIC);
    write_file(&output_dir.join(STYLESHEET), &css)?;

    let index = render_index(posts, &previews, config);
    write_file(&output_dir.join("index.html"), &index.into_string())?;

    for (idx, post) in posts.iter().enumerate() {
        let newer = idx.checked_sub(1).map(|i| &posts[i]);
        let older = posts.get(idx + 1);
        let page = render_post_page(post, newer, older, config);
        write_file(&output_dir.join(post.page_path()), &page.into_string())?;
        summary.pages += 1;
    }

    tracing::info!(
        pages = summary.pages,
        media = summary.media_copied,
        thumbnails = summary.thumbnails,
        "generated site at {}",
        output_dir.display()
    );
    Ok(summary)
}

fn listing_preview(
    post: &Post,
    backend: &impl ImageBackend,
    thumbs_dir: &Path,
    config: &ThumbnailConfig,
) -> Preview {
    let Some(media) = post.primary_media() else {
        return Preview::None;
    };
    let original = image_href(media);
    if media.kind == MediaKind::Video {
        return Preview::Video(original);
    }
    if let Err(e) = create_parent(&thumbs_dir.join(thumbnail_name(&media.site_path))) {
        tracing::warn!(post = %post.id, "no thumbnail for {}: {e}", media.uri);
        return Preview::Original(original);
    }
    match create_thumbnail(backend, &media.source, thumbs_dir, &media.site_path, config) {
        Ok(name) => Preview::Thumbnail(format!("{IMAGES_DIR}/{THUMBS_DIR}/{name}")),
        Err(e) => {
            tracing::warn!(post = %post.id, "no thumbnail for {}: {e}", media.uri);
            Preview::Original(original)
        }
    }
}

/// Path of a copied media file relative to the site root.
fn image_href(media: &MediaRef) -> String {
    format!("{IMAGES_DIR}/{}", media.site_path)
}

fn media_count_label(post: &Post) -> String {
    match post.media.len() {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// `root` is the relative path back to the site root (`""` or `"../"`).
fn base_document(title: &str, root: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href={ (root) (STYLESHEET) };
                link rel="alternate" type="application/rss+xml" title="RSS Feed" href={ (root) (FEED_FILENAME) };
            }
            body {
                (content)
            }
        }
    }
}

fn hashtag_list(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li.tag { "#" (tag) }
                }
            }
        }
    }
}

fn time(post: &Post) -> Markup {
    html! {
        time datetime=(post.timestamp.to_rfc3339()) { (post.display_date()) }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(posts: &[Post], previews: &[Preview], config: &SiteConfig) -> Markup {
    let max = config.feed.title_max_chars;
    let content = html! {
        header.site-header {
            h1 { (config.site.title) }
            a.feed-link href=(FEED_FILENAME) { "RSS Feed" }
        }
        p.post-count { (posts.len()) " posts" }
        main {
            ol.post-list {
                @for (post, preview) in posts.iter().zip(previews) {
                    li.post-card {
                        @match preview {
                            Preview::Thumbnail(src) | Preview::Original(src) => {
                                a.thumb href=(post.page_path()) {
                                    img src=(src) alt="" loading="lazy";
                                }
                            }
                            Preview::Video(src) => {
                                a.thumb href=(post.page_path()) {
                                    video src=(src) muted preload="metadata" {}
                                }
                            }
                            Preview::None => {}
                        }
                        div {
                            h2 {
                                a href=(post.page_path()) { (item_title(post, max)) }
                            }
                            p.meta {
                                (time(post)) " · " (media_count_label(post))
                            }
                            (hashtag_list(&post.hashtags))
                        }
                    }
                }
            }
        }
    };
    base_document(&config.site.title, "", content)
}

fn render_post_page(
    post: &Post,
    newer: Option<&Post>,
    older: Option<&Post>,
    config: &SiteConfig,
) -> Markup {
    let title = item_title(post, config.feed.title_max_chars);
    let content = html! {
        a.back href="../index.html" { "← All posts" }
        article.post {
            h1 { (title) }
            p.meta { (time(post)) }
            p.imported { "Imported from Instagram." }
            @if !post.caption.is_empty() {
                p.caption { (post.caption) }
            }
            (hashtag_list(&post.hashtags))
            div.media {
                @for media in &post.media {
                    @match media.kind {
                        MediaKind::Image => {
                            img src={ "../" (image_href(media)) } alt=(title);
                        }
                        MediaKind::Video => {
                            video src={ "../" (image_href(media)) } controls preload="metadata" {}
                        }
                    }
                }
            }
            @if let Some(location) = &post.location {
                p.location { "Location: " (location) }
            }
            @if !post.missing_media.is_empty() {
                p.missing { (post.missing_media.len()) " media file(s) missing from the export" }
            }
        }
        nav.post-nav {
            @if let Some(p) = newer {
                a.prev href={ "../" (p.page_path()) } rel="prev" { "← Newer" }
            }
            @if let Some(p) = older {
                a.next href={ "../" (p.page_path()) } rel="next" { "Older →" }
            }
        }
    };
    base_document(&format!("{} | {}", title, config.site.title), "../", content)
}
