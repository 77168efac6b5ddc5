// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Typed representation of a multi-file patch.
//!
//! The engine receives a [`DiffResult`] from the VCS collaborator and never
//! mutates it. Paths are kept as plain relative strings so they can serve as
//! stable handles in adjacency maps throughout the analysis pipeline.

use serde::{Deserialize, Serialize};

/// Kind of change applied to a single file.
///
/// Renames are represented as a `Modify` of the destination path by the
/// collaborator contract; `Rename` is kept for collaborators that report the
/// source path explicitly in the patch header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Rename,
}

impl ChangeType {
    /// Get the string representation of the change type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single file's contribution to a diff. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    /// Relative file path.
    pub path: String,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Full unified-diff text for this file.
    pub patch: String,
}

impl FileDiff {
    /// Create a new file diff.
    pub fn new(path: impl Into<String>, change_type: ChangeType, patch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change_type,
            patch: patch.into(),
        }
    }

    /// The directory portion of the path, without a trailing slash.
    /// Empty for files in the repository root.
    pub fn directory(&self) -> &str {
        directory_of(&self.path)
    }

    /// The file extension, without the leading dot. Empty when absent.
    pub fn extension(&self) -> &str {
        extension_of(&self.path)
    }

    /// The final path component.
    pub fn file_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

/// The directory portion of a relative path. Empty for root-level files.
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// The last component of a directory path, or the path itself.
pub fn basename_of(dir: &str) -> &str {
    match dir.rfind('/') {
        Some(idx) => &dir[idx + 1..],
        None => dir,
    }
}

/// The final component of a relative path.
pub fn file_name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// The extension of a path, without the leading dot. Empty when the file
/// name has no dot or starts with one.
pub fn extension_of(path: &str) -> &str {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => "",
    }
}

/// A complete diff over a revision range.
///
/// Invariant: `files` contains each path at most once. The file order is
/// significant; every downstream iteration follows it for determinism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    /// Opaque revision-range identifier, in the VCS's own syntax.
    pub range: String,
    /// Per-file patches, in collaborator order.
    pub files: Vec<FileDiff>,
}

impl DiffResult {
    /// Create a diff result, keeping the first occurrence of each path.
    pub fn new(range: impl Into<String>, files: Vec<FileDiff>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let files = files
            .into_iter()
            .filter(|f| seen.insert(f.path.clone()))
            .collect();
        Self {
            range: range.into(),
            files,
        }
    }

    /// Create an empty diff result.
    pub fn empty(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            files: Vec::new(),
        }
    }

    /// Look up a file by path.
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.iter().find(|f| f.path == path)
    }

    /// All file paths, in collaborator order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Aggregate statistics over a set of patches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of files changed.
    pub files_changed: usize,
    /// Number of lines added.
    pub lines_added: usize,
    /// Number of lines removed.
    pub lines_removed: usize,
}

impl DiffStats {
    /// Compute statistics for a whole diff result.
    pub fn of(diff: &DiffResult) -> Self {
        let mut stats = Self {
            files_changed: diff.files.len(),
            ..Self::default()
        };
        for file in &diff.files {
            let (added, removed) = count_patch_lines(&file.patch);
            stats.lines_added += added;
            stats.lines_removed += removed;
        }
        stats
    }

    /// Total number of lines changed.
    pub fn total_lines_changed(&self) -> usize {
        self.lines_added + self.lines_removed
    }
}

/// Count added and removed lines in a unified-diff patch, skipping the
/// `+++` / `---` file headers.
pub fn count_patch_lines(patch: &str) -> (usize, usize) {
    let mut added = 0;
    let mut removed = 0;
    for line in patch.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if line.starts_with('+') {
            added += 1;
        } else if line.starts_with('-') {
            removed += 1;
        }
    }
    (added, removed)
}

/// Whether a patch line is metadata rather than content.
pub fn is_metadata_line(line: &str) -> bool {
    line.starts_with("@@") || line.starts_with("+++") || line.starts_with("---")
}
