//! Persisted curation state.
//!
//! The selection is the only durable state: a JSON object mapping post ids to
//! a decision, written with sorted keys so diffs stay small.
//!
//! ```json
//! {
//!   "20240102-100000": false,
//!   "20250822-081800": true
//! }
//! ```
//!
//! An id with no entry is undecided and counts as not selected. Entries for
//! ids that are absent from the current export are kept on save, so a
//! re-export that drops a post does not lose the decision.

use crate::types::Post;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("IO error on selection file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Selection file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    entries: BTreeMap<String, bool>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty selection.
    pub fn load(path: &Path) -> Result<Self, SelectionError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(SelectionError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| SelectionError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, falling back to an empty selection with a warning
    /// when the file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("{e}; using an empty selection");
            Self::new()
        })
    }

    /// Load from `path` before editing and saving it back.
    ///
    /// A corrupt file is copied to `<path>.bak` and replaced by an empty
    /// selection, so the next save cannot destroy the only copy of it. An
    /// unreadable file is an error.
    pub fn load_for_update(path: &Path) -> Result<Self, SelectionError> {
        match Self::load(path) {
            Err(err @ SelectionError::Corrupt { .. }) => {
                let backup = backup_path(path);
                fs::copy(path, &backup).map_err(|source| SelectionError::Io {
                    path: backup.clone(),
                    source,
                })?;
                tracing::warn!("{err}; saved a copy to {}, starting empty", backup.display());
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Write pretty JSON with a trailing newline, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SelectionError> {
        let io_err = |source: io::Error| SelectionError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| io_err(e.into()))?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)
    }

    /// `Some(decision)` if the id has been reviewed.
    pub fn decision(&self, id: &str) -> Option<bool> {
        self.entries.get(id).copied()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.decision(id).unwrap_or(false)
    }

    pub fn set(&mut self, id: &str, selected: bool) {
        self.entries.insert(id.to_string(), selected);
    }

    /// Record every known decision as not selected.
    pub fn clear(&mut self) {
        self.entries.values_mut().for_each(|v| *v = false);
    }

    /// Number of ids recorded as selected, including ids absent from the export.
    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|v| **v).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The selected subset of `posts`, in the order given.
    pub fn filter<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|p| self.is_selected(&p.id)).collect()
    }
}

/// `selected_posts.json` → `selected_posts.json.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_post;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let selection = Selection::load(&tmp.path().join("none.json")).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        let mut selection = Selection::new();
        selection.set("20250822-081800", true);
        selection.set("20240102-100000", false);
        selection.save(&path).unwrap();

        let loaded = Selection::load(&path).unwrap();
        assert_eq!(loaded, selection);
        assert_eq!(loaded.decision("20240102-100000"), Some(false));
        assert_eq!(loaded.decision("unknown"), None);
    }

    #[test]
    fn saved_file_is_sorted_pretty_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/sel.json");
        let mut selection = Selection::new();
        selection.set("b", true);
        selection.set("a", false);
        selection.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"a\": false,\n  \"b\": true\n}\n");
    }

    #[test]
    fn corrupt_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        fs::write(&path, "{not json").unwrap();
        let err = Selection::load(&path).unwrap_err();
        assert!(matches!(err, SelectionError::Corrupt { .. }));
        assert!(err.to_string().contains("sel.json"));
    }

    #[test]
    fn old_list_format_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        fs::write(&path, "[0, 1, 2]").unwrap();
        assert!(matches!(
            Selection::load(&path),
            Err(SelectionError::Corrupt { .. })
        ));
    }

    #[test]
    fn load_or_default_recovers_from_corruption() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        fs::write(&path, "garbage").unwrap();
        assert!(Selection::load_or_default(&path).is_empty());
    }

    #[test]
    fn corrupt_file_is_backed_up_before_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("selected_posts.json");
        fs::write(&path, "{\"20250822-081800\": tru").unwrap();

        let mut selection = Selection::load_for_update(&path).unwrap();
        assert!(selection.is_empty());
        let backup = tmp.path().join("selected_posts.json.bak");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{\"20250822-081800\": tru");

        selection.set("20240102-100000", true);
        selection.save(&path).unwrap();
        assert!(Selection::load(&path).unwrap().is_selected("20240102-100000"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{\"20250822-081800\": tru");
    }

    #[test]
    fn load_for_update_leaves_valid_and_missing_files_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        assert!(Selection::load_for_update(&path).unwrap().is_empty());

        fs::write(&path, r#"{"a": true}"#).unwrap();
        assert!(Selection::load_for_update(&path).unwrap().is_selected("a"));
        assert!(!tmp.path().join("sel.json.bak").exists());
    }

    #[test]
    fn unknown_ids_survive_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.json");
        fs::write(&path, r#"{"19990101-000000": true}"#).unwrap();

        let mut selection = Selection::load(&path).unwrap();
        selection.set("20250822-081800", true);
        selection.save(&path).unwrap();

        let reloaded = Selection::load(&path).unwrap();
        assert!(reloaded.is_selected("19990101-000000"));
        assert_eq!(reloaded.selected_count(), 2);
    }

    #[test]
    fn clear_keeps_entries_as_false() {
        let mut selection = Selection::new();
        selection.set("a", true);
        selection.set("b", true);
        selection.clear();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.selected_count(), 0);
        assert_eq!(selection.decision("a"), Some(false));
    }

    #[test]
    fn filter_preserves_post_order() {
        let posts = vec![sample_post(300, "c"), sample_post(200, "b"), sample_post(100, "a")];
        let mut selection = Selection::new();
        selection.set(&posts[2].id, true);
        selection.set(&posts[0].id, true);
        selection.set(&posts[1].id, false);
        let picked: Vec<&str> = selection.filter(&posts).iter().map(|p| p.caption.as_str()).collect();
        assert_eq!(picked, vec!["c", "a"]);
    }
}
