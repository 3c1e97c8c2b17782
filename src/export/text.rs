//! Caption text helpers shared by both export formats and the renderers.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"));

static INLINE_HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*#\w+").expect("inline hashtag pattern is valid"));

/// Undo the double encoding found in JSON exports.
///
/// The JSON writer emits every UTF-8 byte as its own `\u00XX` escape, so
/// `café` arrives as `cafÃ©`. When every code point fits in a byte and the
/// bytes form valid UTF-8 the text is reinterpreted; anything else (already
/// correct text, emoji outside Latin-1) is returned unchanged.
pub fn fix_encoding(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    let bytes: Option<Vec<u8>> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();
    bytes
        .and_then(|b| String::from_utf8(b).ok())
        .unwrap_or_else(|| text.to_string())
}

/// Hashtags in order of first appearance, without the `#`.
///
/// Matching is Unicode-aware (`#café` yields `café`); deduplication is
/// exact, so `#Paris` and `#paris` are both kept.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

/// Caption with inline hashtags removed and whitespace collapsed to single spaces.
pub fn title_text(caption: &str) -> String {
    let stripped = INLINE_HASHTAG.replace_all(caption, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters at a word boundary, appending `...`.
///
/// Counts characters, not bytes. A single word longer than the limit is cut
/// mid-word.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rsplit_once(' ') {
        Some((before, _)) if !before.trim().is_empty() => before,
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_encoding_repairs_mojibake() {
        // "café 😀" as the JSON export writes it: one char per UTF-8 byte
        let mangled: String = "café 😀".bytes().map(char::from).collect();
        assert_ne!(mangled, "café 😀");
        assert_eq!(fix_encoding(&mangled), "café 😀");
    }

    #[test]
    fn fix_encoding_leaves_correct_text_alone() {
        assert_eq!(fix_encoding("café"), "café");
        assert_eq!(fix_encoding("plain ascii"), "plain ascii");
        assert_eq!(fix_encoding("emoji 😀 ok"), "emoji 😀 ok");
    }

    #[test]
    fn fix_encoding_keeps_latin1_that_is_not_utf8() {
        // "é" alone (0xE9) is not a valid UTF-8 sequence
        assert_eq!(fix_encoding("é"), "é");
    }

    #[test]
    fn hashtags_in_order_and_deduplicated() {
        let tags = extract_hashtags("Sunset #travel at #Paris #travel again #paris");
        assert_eq!(tags, vec!["travel", "Paris", "paris"]);
    }

    #[test]
    fn hashtags_unicode_word_chars() {
        assert_eq!(extract_hashtags("#café #日本 #a_b1"), vec!["café", "日本", "a_b1"]);
    }

    #[test]
    fn hashtags_none() {
        assert!(extract_hashtags("no tags # here").is_empty());
        assert!(extract_hashtags("").is_empty());
    }

    #[test]
    fn title_text_strips_tags_and_newlines() {
        assert_eq!(
            title_text("Morning walk\n\nby the river #nature #walk"),
            "Morning walk by the river"
        );
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_title("short", 10), "short");
    }

    #[test]
    fn truncate_at_word_boundary() {
        assert_eq!(
            truncate_title("the quick brown fox jumps", 12),
            "the quick..."
        );
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "éééééééééé ééé";
        assert_eq!(truncate_title(text, 14), text);
        assert_eq!(truncate_title(text, 12), "éééééééééé...");
    }

    #[test]
    fn truncate_single_long_word() {
        assert_eq!(truncate_title("abcdefghijkl", 5), "abcde...");
    }
}
