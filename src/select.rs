//! Curating which posts go into the feed.
//!
//! Two ways to record decisions in a [`Selection`]:
//!
//! - **Bulk**: a [`Filter`] predicate marks every matching post selected (or
//!   deselected). Posts that do not match keep whatever decision they had.
//! - **Review**: [`review`] walks the posts that have no decision yet, one at a
//!   time, reading commands from any `BufRead` so it can be driven by stdin or
//!   by a test.
//!
//! Neither touches the disk; the caller loads and saves the selection.

use crate::output;
use crate::selection::Selection;
use crate::types::Post;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

/// Bulk selection predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Year(i32),
    /// Inclusive on both ends; the bounds may be given in either order.
    YearRange(i32, i32),
    /// Tag without the `#`, compared case-insensitively.
    Hashtag(String),
    HasHashtags,
    /// Case-insensitive substring of the location name.
    Location(String),
    HasLocation,
    /// Every inner filter matches. An empty list matches everything.
    And(Vec<Filter>),
    /// At least one inner filter matches. An empty list matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Year(year) => post.year() == *year,
            Self::YearRange(a, b) => (*a.min(b)..=*a.max(b)).contains(&post.year()),
            Self::Hashtag(tag) => {
                let wanted = tag.trim_start_matches('#').to_lowercase();
                post.hashtags.iter().any(|t| t.to_lowercase() == wanted)
            }
            Self::HasHashtags => !post.hashtags.is_empty(),
            Self::Location(needle) => post
                .location
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(&needle.to_lowercase())),
            Self::HasLocation => post.location.is_some(),
            Self::And(filters) => filters.iter().all(|f| f.matches(post)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(post)),
        }
    }

    /// `None` when empty, the filter itself when there is one, `And` otherwise.
    pub fn all_of(mut filters: Vec<Filter>) -> Option<Filter> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self::And(filters)),
        }
    }

    /// `None` when empty, the filter itself when there is one, `Or` otherwise.
    pub fn any_of(mut filters: Vec<Filter>) -> Option<Filter> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self::Or(filters)),
        }
    }
}

/// Record `selected` for every post matching `filter`. Returns the match count.
pub fn apply(selection: &mut Selection, posts: &[Post], filter: &Filter, selected: bool) -> usize {
    let mut count = 0;
    for post in posts.iter().filter(|p| filter.matches(p)) {
        selection.set(&post.id, selected);
        count += 1;
    }
    tracing::debug!(?filter, selected, count, "applied filter");
    count
}

/// Per-year counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearCounts {
    pub posts: usize,
    pub selected: usize,
}

/// Counts over the current export. Ids in the selection that are not in the
/// export are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub selected: usize,
    pub undecided: usize,
    pub by_year: BTreeMap<i32, YearCounts>,
    pub selected_with_hashtags: usize,
    pub selected_with_location: usize,
}

impl Stats {
    pub fn collect(posts: &[Post], selection: &Selection) -> Self {
        let mut stats = Self {
            total: posts.len(),
            ..Self::default()
        };
        for post in posts {
            let year = stats.by_year.entry(post.year()).or_default();
            year.posts += 1;
            match selection.decision(&post.id) {
                None => stats.undecided += 1,
                Some(false) => {}
                Some(true) => {
                    year.selected += 1;
                    stats.selected += 1;
                    if !post.hashtags.is_empty() {
                        stats.selected_with_hashtags += 1;
                    }
                    if post.location.is_some() {
                        stats.selected_with_location += 1;
                    }
                }
            }
        }
        stats
    }
}

/// How an interactive review ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// `d` or end of input: the caller should save.
    Done,
    /// `q`: the caller should discard the changes.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Yes,
    No,
    Skip,
    Done,
    Quit,
    Stats,
}

fn parse_command(input: &str) -> Option<Command> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Command::Yes),
        "n" | "no" => Some(Command::No),
        "s" | "skip" => Some(Command::Skip),
        "d" | "done" => Some(Command::Done),
        "q" | "quit" => Some(Command::Quit),
        "stats" => Some(Command::Stats),
        _ => None,
    }
}

const PROMPT: &str = "Select this post? (y/n/s/d/q/stats): ";
const HELP: &str = "Commands: y = select, n = reject, s = skip, d = done (save), q = quit without saving, stats";

/// Review undecided posts one by one.
///
/// `y`/`n` record a decision, `s` leaves the post undecided, `stats` prints
/// counts and asks again. Unknown input prints the command list and asks again.
pub fn review<R: BufRead, W: Write>(
    posts: &[Post],
    selection: &mut Selection,
    mut input: R,
    mut out: W,
) -> io::Result<ReviewOutcome> {
    let pending: Vec<&Post> = posts
        .iter()
        .filter(|p| selection.decision(&p.id).is_none())
        .collect();
    writeln!(out, "{} posts to review ({} total)", pending.len(), posts.len())?;
    writeln!(out, "{HELP}")?;

    let mut line = String::new();
    for (index, post) in pending.iter().enumerate() {
        writeln!(out)?;
        for l in output::format_post_preview(post, index + 1, pending.len()) {
            writeln!(out, "{l}")?;
        }
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(ReviewOutcome::Done);
            }
            match parse_command(&line) {
                Some(Command::Yes) => {
                    selection.set(&post.id, true);
                    writeln!(out, "Selected ({} total)", selection.selected_count())?;
                    break;
                }
                Some(Command::No) => {
                    selection.set(&post.id, false);
                    writeln!(out, "Rejected")?;
                    break;
                }
                Some(Command::Skip) => break,
                Some(Command::Done) => return Ok(ReviewOutcome::Done),
                Some(Command::Quit) => return Ok(ReviewOutcome::Quit),
                Some(Command::Stats) => {
                    for l in output::format_stats(&Stats::collect(posts, selection)) {
                        writeln!(out, "{l}")?;
                    }
                }
                None => writeln!(out, "{HELP}")?,
            }
        }
    }
    writeln!(out, "All posts reviewed")?;
    Ok(ReviewOutcome::Done)
}
