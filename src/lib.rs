//! # Gramfeed
//!
//! Turns an unpacked Instagram data export into a static website and a curated
//! RSS feed. Every post gets a page; only the posts the operator selects go
//! into `feed.xml`.
//!
//! # Architecture: Parse, Curate, Render
//!
//! ```text
//! 1. Parse     insta-export/  →  Vec<Post>          (JSON or HTML records → normalized posts)
//! 2. Curate    Vec<Post>      →  selected_posts.json (bulk filters + one-by-one review)
//! 3. Render    Vec<Post>      →  site/               (HTML pages, thumbnails, feed.xml)
//! ```
//!
//! The post list is never persisted. Parsing is cheap and deterministic, so
//! every command re-reads the export; the selection file is the only state
//! that survives between runs, keyed by post id.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`export`] | Detects the export format and normalizes records into [`types::Post`] |
//! | [`selection`] | The persisted `id → selected` mapping |
//! | [`select`] | Bulk filters, interactive review and selection stats |
//! | [`generate`] | Renders `index.html`, post pages and thumbnails with Maud |
//! | [`feed`] | Renders the RSS 2.0 feed of selected posts |
//! | [`serve`] | Local preview server for the output directory |
//! | [`config`] | `gramfeed.toml` loading, validation, merging and CSS generation |
//! | [`types`] | The format-neutral post model shared by every stage |
//! | [`imaging`] | Square JPEG thumbnails via the `image` crate |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Timestamp Ids
//!
//! A post's id is its creation time, `YYYYMMDD-HHMMSS` in UTC. Both export
//! formats carry the timestamp, so the same post gets the same id whichever
//! format was downloaded, and a re-export that reorders records keeps every
//! decision in the selection file valid. Two posts in the same second are
//! told apart by a short content digest.
//!
//! ## Selection Is Not Generation
//!
//! The site shows everything; the feed shows the selection. Generating never
//! edits the selection, and a missing or corrupt selection file produces an
//! empty feed with a warning rather than a failed build.
//!
//! ## Deterministic Output
//!
//! Nothing rendered depends on the wall clock or on iteration order of a hash
//! map. The feed's `lastBuildDate` is the newest selected post, not the time
//! of the run, so regenerating an unchanged export rewrites identical bytes.

pub mod config;
pub mod export;
pub mod feed;
pub mod generate;
pub mod imaging;
pub mod output;
pub mod select;
pub mod selection;
pub mod serve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
