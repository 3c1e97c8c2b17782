//! Site configuration module.
//!
//! Handles loading, validating, and merging `gramfeed.toml`. Every key is
//! optional: the stock defaults are serialized to a TOML table and the user
//! file is merged on top of it, so a config only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "site"                      # Where generated files land
//! base_url = "http://localhost:8000"       # Prefix for absolute links in the feed
//! selection_file = "selected_posts.json"   # Persisted id -> selected mapping
//!
//! [site]
//! title = "Instagram Archive"
//!
//! [feed]
//! title = "Instagram Archive"
//! description = "Posts from Instagram export"
//! language = "en"
//! title_max_chars = 100                    # Item titles are truncated past this
//!
//! [thumbnails]
//! size = 400                               # Square edge in pixels
//! quality = 85                             # JPEG quality (1-100)
//!
//! [serve]
//! port = 8000
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#0066cc"
//! accent = "#e1f5fe"                       # Hashtag pill background
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#66aaff"
//! accent = "#12323f"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A merged value that does not fit [`SiteConfig`]; [`load_config`]
    /// turns it into [`ConfigError::Toml`] naming the file.
    #[error("Config error: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `gramfeed.toml`.
///
/// Passed explicitly into the parser, generators and server; nothing reads
/// global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory the site and feed are written to.
    pub output_dir: String,
    /// Public URL the output directory is deployed under, without trailing slash.
    pub base_url: String,
    /// Path of the persisted selection mapping.
    pub selection_file: String,
    pub site: SiteSection,
    pub feed: FeedConfig,
    pub thumbnails: ThumbnailsConfig,
    pub serve: ServeConfig,
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: "site".to_string(),
            base_url: "http://localhost:8000".to_string(),
            selection_file: "selected_posts.json".to_string(),
            site: SiteSection::default(),
            feed: FeedConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            serve: ServeConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https:// (got {:?})",
                self.base_url
            )));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.feed.title_max_chars < 10 {
            return Err(ConfigError::Validation(
                "feed.title_max_chars must be at least 10".into(),
            ));
        }
        if self.thumbnails.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation("serve.port must be non-zero".into()));
        }
        Ok(())
    }

    /// `base_url` with any trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    pub fn selection_path(&self) -> PathBuf {
        PathBuf::from(&self.selection_file)
    }
}

/// Static site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Heading and `<title>` of the listing page.
    pub title: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Instagram Archive".to_string(),
        }
    }
}

/// RSS channel metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    /// RFC 1766 language tag for the channel.
    pub language: String,
    /// Maximum item title length in characters before truncation.
    pub title_max_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: "Instagram Archive".to_string(),
            description: "Posts from Instagram export".to_string(),
            language: "en".to_string(),
            title_max_chars: 100,
        }
    }
}

/// Listing thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Edge of the square thumbnail in pixels.
    pub size: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 400,
            quality: 85,
        }
    }
}

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, counts, location lines.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    /// Hashtag pill background.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#0066cc".to_string(),
            accent: "#e1f5fe".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#66aaff".to_string(),
            accent: "#12323f".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(config_file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_file).map_err(|source| ConfigError::Io {
        path: config_file.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: config_file.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config_file`, falling back to stock defaults when absent.
pub fn load_config(config_file: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(config_file)?;
    if overlay.is_none() {
        tracing::debug!(path = %config_file.display(), "no config file, using defaults");
    }
    resolve_config(stock_defaults_value(), overlay).map_err(|e| match e {
        ConfigError::Deserialize(source) => ConfigError::Toml {
            path: config_file.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Returns a fully-commented stock `gramfeed.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gramfeed configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Directory the static site and feed.xml are written to.
output_dir = "site"

# Public URL the output directory will be served from. Used to build
# absolute links and enclosure URLs in the feed.
base_url = "http://localhost:8000"

# Where `gramfeed select` stores curation decisions (id -> true/false).
selection_file = "selected_posts.json"

# ---------------------------------------------------------------------------
# Static site
# ---------------------------------------------------------------------------
[site]
title = "Instagram Archive"

# ---------------------------------------------------------------------------
# RSS feed (selected posts only)
# ---------------------------------------------------------------------------
[feed]
title = "Instagram Archive"
description = "Posts from Instagram export"
language = "en"
# Item titles longer than this many characters are cut at a word boundary.
title_max_chars = 100

# ---------------------------------------------------------------------------
# Listing thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
size = 400
quality = 85

# ---------------------------------------------------------------------------
# Preview server (`gramfeed serve`)
# ---------------------------------------------------------------------------
[serve]
port = 8000

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"
border = "#e0e0e0"
link = "#0066cc"
accent = "#e1f5fe"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#66aaff"
accent = "#12323f"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_accent = colors.dark.accent,
    )
}
