//! CLI output formatting.
//!
//! Every command reports what it found in terms of posts (id, date, a caption
//! excerpt), with file paths as secondary context on indented lines.
//!
//! # Output Format
//!
//! ## Check / parse
//!
//! ```text
//! Export: insta-export (JSON, posts_1.json)
//! Posts: 214 (2 empty records skipped)
//! Warnings: 3
//!     post 20250822-081800: media file not found: media/posts/202508/1.jpg
//! ```
//!
//! ## Select
//!
//! ```text
//! Post 3 of 41: 20250822-081800
//!     Date: Aug 22, 2025
//!     Caption: Sunset at the beach #travel
//!     Media: 2 items
//!     Tags: #travel
//!     Location: Lisbon
//! ```
//!
//! ## Generate
//!
//! ```text
//! Site: site/
//!     214 post pages
//!     250 media files, 190 thumbnails (24 using the original)
//!     Feed: 41 items → site/feed.xml
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function returning lines, so it can be tested
//! without capturing stdout, and a `print_*` wrapper that writes them.

use crate::export::ParseReport;
use crate::generate::GenerateSummary;
use crate::select::Stats;
use crate::selection::Selection;
use crate::types::Post;
use std::path::Path;

/// Caption excerpt length in CLI listings, in characters.
const EXCERPT_CHARS: usize = 100;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// First line of the caption, cut to `max` characters with `...`.
fn excerpt(caption: &str, max: usize) -> String {
    let line = caption.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_parse_report(report: &ParseReport, export_root: &Path) -> Vec<String> {
    let file = report
        .format
        .records_file()
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut lines = vec![format!(
        "Export: {} ({}, {})",
        export_root.display(),
        report.format,
        file
    )];
    let skipped = match report.skipped_empty {
        0 => String::new(),
        n => format!(" ({} skipped)", plural(n, "empty record", "empty records")),
    };
    lines.push(format!("Posts: {}{}", report.posts.len(), skipped));
    if let (Some(newest), Some(oldest)) = (report.posts.first(), report.posts.last()) {
        lines.push(format!(
            "{}{} to {}",
            indent(1),
            oldest.display_date(),
            newest.display_date()
        ));
    }
    if !report.warnings.is_empty() {
        lines.push(format!("Warnings: {}", report.warnings.len()));
        for warning in &report.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

pub fn print_parse_report(report: &ParseReport, export_root: &Path) {
    for line in format_parse_report(report, export_root) {
        println!("{line}");
    }
}

// ============================================================================
// Select
// ============================================================================

/// Preview shown for each post during interactive review.
pub fn format_post_preview(post: &Post, position: usize, total: usize) -> Vec<String> {
    let mut lines = vec![format!("Post {} of {}: {}", position, total, post.id)];
    lines.push(format!("{}Date: {}", indent(1), post.display_date()));
    if !post.caption.is_empty() {
        lines.push(format!(
            "{}Caption: {}",
            indent(1),
            excerpt(&post.caption, EXCERPT_CHARS)
        ));
    }
    let mut media = format!("{}Media: {}", indent(1), plural(post.media.len(), "item", "items"));
    if !post.missing_media.is_empty() {
        media.push_str(&format!(" ({} missing)", post.missing_media.len()));
    }
    lines.push(media);
    if !post.hashtags.is_empty() {
        let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{t}")).collect();
        lines.push(format!("{}Tags: {}", indent(1), tags.join(" ")));
    }
    if let Some(location) = &post.location {
        lines.push(format!("{}Location: {}", indent(1), location));
    }
    lines
}

pub fn format_stats(stats: &Stats) -> Vec<String> {
    let mut lines = vec![
        format!("Selected: {} of {}", stats.selected, stats.total),
        format!("{}Undecided: {}", indent(1), stats.undecided),
        format!("{}With hashtags: {}", indent(1), stats.selected_with_hashtags),
        format!("{}With location: {}", indent(1), stats.selected_with_location),
    ];
    if !stats.by_year.is_empty() {
        lines.push("By year:".to_string());
        for (year, counts) in &stats.by_year {
            lines.push(format!(
                "{}{}: {} of {}",
                indent(1),
                year,
                counts.selected,
                plural(counts.posts, "post", "posts")
            ));
        }
    }
    lines
}

pub fn print_stats(stats: &Stats) {
    for line in format_stats(stats) {
        println!("{line}");
    }
}

/// One line per selected post, newest first.
pub fn format_selected_list(posts: &[Post], selection: &Selection) -> Vec<String> {
    let selected = selection.filter(posts);
    if selected.is_empty() {
        return vec!["No posts selected".to_string()];
    }
    let mut lines = vec![format!("{} selected:", plural(selected.len(), "post", "posts"))];
    for post in selected {
        lines.push(format!(
            "{}{} {} {}",
            indent(1),
            post.id,
            post.display_date(),
            excerpt(&post.caption, 60)
        ));
    }
    lines
}

pub fn print_selected_list(posts: &[Post], selection: &Selection) {
    for line in format_selected_list(posts, selection) {
        println!("{line}");
    }
}

/// Bulk filter result: how many posts matched and the resulting total.
pub fn format_filter_result(matched: usize, selected: bool, selection_total: usize) -> String {
    let verb = if selected { "Selected" } else { "Deselected" };
    format!(
        "{verb} {} ({selection_total} selected in total)",
        plural(matched, "post", "posts")
    )
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_summary(summary: &GenerateSummary, feed_items: usize) -> Vec<String> {
    let mut lines = vec![format!("Site: {}/", summary.output_dir.display())];
    lines.push(format!(
        "{}{}",
        indent(1),
        plural(summary.pages, "post page", "post pages")
    ));
    let mut media = format!(
        "{}{}, {}",
        indent(1),
        plural(summary.media_copied, "media file", "media files"),
        plural(summary.thumbnails, "thumbnail", "thumbnails")
    );
    if summary.thumbnail_fallbacks > 0 {
        media.push_str(&format!(" ({} using the original)", summary.thumbnail_fallbacks));
    }
    lines.push(media);
    if summary.missing_media > 0 {
        lines.push(format!(
            "{}{} missing from the export",
            indent(1),
            plural(summary.missing_media, "media file", "media files")
        ));
    }
    lines.push(format!(
        "{}Feed: {} → {}",
        indent(1),
        plural(feed_items, "item", "items"),
        summary.output_dir.join(crate::feed::FEED_FILENAME).display()
    ));
    lines
}

pub fn print_generate_summary(summary: &GenerateSummary, feed_items: usize) {
    for line in format_generate_summary(summary, feed_items) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportFormat, ParseWarning};
    use crate::select::YearCounts;
    use crate::test_helpers::{sample_media, sample_post};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn excerpt_first_line_and_truncation() {
        assert_eq!(excerpt("\n  first line  \nsecond", 50), "first line");
        assert_eq!(excerpt("abcdef", 3), "abc...");
        assert_eq!(excerpt("ééééé", 5), "ééééé");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "post", "posts"), "1 post");
        assert_eq!(plural(0, "post", "posts"), "0 posts");
    }

    #[test]
    fn parse_report_lines() {
        let report = ParseReport {
            format: ExportFormat::Json(PathBuf::from("x/posts_1.json")),
            posts: vec![sample_post(1_755_850_680, "new"), sample_post(1_684_152_000, "old")],
            warnings: vec![ParseWarning::MissingMedia {
                post: "20250822-081800".into(),
                uri: "media/1.jpg".into(),
            }],
            skipped_empty: 1,
        };
        let lines = format_parse_report(&report, Path::new("insta-export"));
        assert_eq!(
            lines,
            vec![
                "Export: insta-export (JSON, posts_1.json)",
                "Posts: 2 (1 empty record skipped)",
                "    May 15, 2023 to Aug 22, 2025",
                "Warnings: 1",
                "    post 20250822-081800: media file not found: media/1.jpg",
            ]
        );
    }

    #[test]
    fn parse_report_without_posts() {
        let report = ParseReport {
            format: ExportFormat::Markup(PathBuf::from("posts_1.html")),
            posts: vec![],
            warnings: vec![],
            skipped_empty: 0,
        };
        assert_eq!(
            format_parse_report(&report, Path::new("e")),
            vec!["Export: e (HTML, posts_1.html)", "Posts: 0"]
        );
    }

    #[test]
    fn post_preview_lines() {
        let mut post = sample_post(1_755_850_680, "Sunset #travel\nsecond line");
        post.media = vec![sample_media("m/1.jpg", 1)];
        post.missing_media = vec!["m/2.jpg".into()];
        post.location = Some("Lisbon".into());
        assert_eq!(
            format_post_preview(&post, 3, 41),
            vec![
                "Post 3 of 41: 20250822-081800",
                "    Date: Aug 22, 2025",
                "    Caption: Sunset #travel",
                "    Media: 1 item (1 missing)",
                "    Tags: #travel",
                "    Location: Lisbon",
            ]
        );
    }

    #[test]
    fn stats_lines() {
        let stats = Stats {
            total: 3,
            selected: 2,
            undecided: 1,
            by_year: BTreeMap::from([
                (2024, YearCounts { posts: 1, selected: 0 }),
                (2025, YearCounts { posts: 2, selected: 2 }),
            ]),
            selected_with_hashtags: 1,
            selected_with_location: 0,
        };
        let lines = format_stats(&stats);
        assert_eq!(lines[0], "Selected: 2 of 3");
        assert_eq!(lines[4], "By year:");
        assert_eq!(lines[5], "    2024: 0 of 1 post");
        assert_eq!(lines[6], "    2025: 2 of 2 posts");
    }

    #[test]
    fn selected_list() {
        let posts = vec![sample_post(200, "b"), sample_post(100, "a")];
        let mut selection = Selection::new();
        assert_eq!(format_selected_list(&posts, &selection), vec!["No posts selected"]);
        selection.set(&posts[1].id, true);
        assert_eq!(
            format_selected_list(&posts, &selection),
            vec!["1 post selected:", "    19700101-000140 Jan 01, 1970 a"]
        );
    }

    #[test]
    fn filter_result_line() {
        assert_eq!(
            format_filter_result(3, true, 10),
            "Selected 3 posts (10 selected in total)"
        );
        assert_eq!(
            format_filter_result(1, false, 0),
            "Deselected 1 post (0 selected in total)"
        );
    }

    #[test]
    fn generate_summary_lines() {
        let summary = GenerateSummary {
            output_dir: PathBuf::from("site"),
            pages: 3,
            media_copied: 4,
            thumbnails: 2,
            thumbnail_fallbacks: 1,
            missing_media: 1,
        };
        assert_eq!(
            format_generate_summary(&summary, 1),
            vec![
                "Site: site/",
                "    3 post pages",
                "    4 media files, 2 thumbnails (1 using the original)",
                "    1 media file missing from the export",
                "    Feed: 1 item → site/feed.xml",
            ]
        );
    }
}
