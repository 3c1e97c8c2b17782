//! Reader for `posts_1.html`, the markup flavour of the export.
//!
//! Each post is a `div.uiBoxWhite.noborder` block:
//!
//! ```html
//! <div class="pam _3-95 _2ph- _a6-g uiBoxWhite noborder">
//!   <h2 class="_3-95 _2pim _a6-h _a6-i">Sunset #travel</h2>
//!   <div class="_3-95 _a6-p">
//!     <img src="media/posts/202508/17912345.jpg" class="_a6_o _3-96">
//!     <table><tr><td><div class="_a6-q">Latitude</div></td><td><div class="_a6-q">38.7</div></td></tr></table>
//!   </div>
//!   <div class="_3-94 _a6-o">Aug 22, 2025 8:18 am</div>
//! </div>
//! ```
//!
//! Dates are rendered without a timezone; they are read as UTC so both export
//! formats sort the same way.

use super::{ParseWarning, RawRecord, RecordSet};
use crate::types::Coordinates;
use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// CSS selectors for the post blocks, compiled once per parse.
struct Selectors {
    post: Selector,
    title: Selector,
    date: Selector,
    media: Selector,
    row: Selector,
    cell: Selector,
}

impl Selectors {
    fn new() -> Self {
        let parse = |css: &str| Selector::parse(css).expect("static selector is valid");
        Self {
            post: parse("div.uiBoxWhite.noborder"),
            title: parse("h2"),
            date: parse("div._a6-o"),
            media: parse("img[src], video[src]"),
            row: parse("tr"),
            cell: parse("td"),
        }
    }
}

/// Date layouts seen across export revisions.
const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y, %I:%M %p",
    "%b %d, %Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse every post block. Markup problems never abort: unparseable dates
/// become warnings, blocks without caption and media are counted as empty.
pub fn parse_records(path: &Path, content: &str) -> RecordSet {
    let sel = Selectors::new();
    let document = Html::parse_document(content);
    let mut set = RecordSet::default();

    for (index, block) in document.select(&sel.post).enumerate() {
        let caption = block
            .select(&sel.title)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let media_uris: Vec<String> = block
            .select(&sel.media)
            .filter_map(|el| el.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .collect();

        if caption.trim().is_empty() && media_uris.is_empty() {
            set.empty += 1;
            continue;
        }

        let date_text = block.select(&sel.date).next().map(element_text);
        let timestamp = match date_text.as_deref().map(parse_date) {
            Some(Some(ts)) => ts,
            Some(None) => {
                set.warnings.push(ParseWarning::MalformedRecord {
                    file: path.to_path_buf(),
                    index,
                    reason: format!("unrecognized date {:?}", date_text.unwrap_or_default()),
                });
                continue;
            }
            None => {
                set.warnings.push(ParseWarning::MalformedRecord {
                    file: path.to_path_buf(),
                    index,
                    reason: "no date".to_string(),
                });
                continue;
            }
        };

        let (coordinates, location_name) = location(block, &sel);
        set.records.push(RawRecord {
            caption,
            timestamp,
            media_uris,
            coordinates,
            location_name,
        });
    }
    set
}

/// Text content with the HTML entities already decoded by the parser.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse a rendered date as UTC.
///
/// Exports sometimes put a narrow no-break space before the meridiem, so all
/// Unicode whitespace is folded to single ASCII spaces first.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Coordinates and place name from the label/value tables inside a post.
fn location(block: ElementRef<'_>, sel: &Selectors) -> (Option<Coordinates>, Option<String>) {
    let mut latitude = None;
    let mut longitude = None;
    let mut name = None;
    for row in block.select(&sel.row) {
        let cells: Vec<String> = row.select(&sel.cell).map(element_text).collect();
        let [label, value, ..] = cells.as_slice() else {
            continue;
        };
        match label.as_str() {
            "Latitude" => latitude = latitude.or(value.parse::<f64>().ok()),
            "Longitude" => longitude = longitude.or(value.parse::<f64>().ok()),
            "Location" | "Place" if !value.is_empty() => {
                name = name.or(Some(value.clone()));
            }
            _ => {}
        }
    }
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };
    (coordinates, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::markup_post;
    use chrono::TimeZone;

    fn parse(body: &str) -> RecordSet {
        let html = format!("<html><body>{body}</body></html>");
        parse_records(Path::new("posts_1.html"), &html)
    }

    #[test]
    fn parse_date_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 8, 22, 8, 18, 0).unwrap();
        assert_eq!(parse_date("Aug 22, 2025 8:18 am"), Some(expected));
        assert_eq!(parse_date("Aug 22, 2025 8:18 AM"), Some(expected));
        assert_eq!(parse_date("Aug 22, 2025, 8:18\u{202f}am"), Some(expected));
        assert_eq!(
            parse_date("Aug 22, 2025 8:18 pm"),
            Some(Utc.with_ymd_and_hms(2025, 8, 22, 20, 18, 0).unwrap())
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn parses_post_block() {
        let set = parse(&markup_post(
            "Caf&eacute; &lt;3 &amp; more #food",
            "Aug 22, 2025 8:18 am",
            &["media/posts/1.jpg", "media/posts/2.mp4"],
            None,
        ));
        assert_eq!(set.records.len(), 1);
        let r = &set.records[0];
        assert_eq!(r.caption, "Café <3 & more #food");
        assert_eq!(r.media_uris, vec!["media/posts/1.jpg", "media/posts/2.mp4"]);
        assert_eq!(r.timestamp.timestamp(), 1_755_850_680);
    }

    #[test]
    fn preserves_raw_unicode() {
        let set = parse(&markup_post("Olá 🌊", "Aug 22, 2025 8:18 am", &[], None));
        assert_eq!(set.records[0].caption, "Olá 🌊");
    }

    #[test]
    fn reads_location_table() {
        let set = parse(&markup_post(
            "geo",
            "Jan 02, 2024 10:00 am",
            &["m/1.jpg"],
            Some((38.7, -9.1)),
        ));
        let c = set.records[0].coordinates.unwrap();
        assert_eq!((c.latitude, c.longitude), (38.7, -9.1));
    }

    #[test]
    fn bad_date_is_warning() {
        let body = format!(
            "{}{}",
            markup_post("fine", "Jan 02, 2024 10:00 am", &[], None),
            markup_post("broken", "sometime", &[], None)
        );
        let set = parse(&body);
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.warnings.len(), 1);
        assert!(set.warnings[0].to_string().contains("record #1"));
        assert!(set.warnings[0].to_string().contains("sometime"));
    }

    #[test]
    fn empty_block_counted() {
        let set = parse(&markup_post("", "Jan 02, 2024 10:00 am", &[], None));
        assert!(set.records.is_empty());
        assert_eq!(set.empty, 1);
    }
}
