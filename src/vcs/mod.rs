// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! VCS collaborator contract.
//!
//! The engine never talks to Jujutsu directly. All repository access goes
//! through the [`Vcs`] trait, which a thin adapter implements against the
//! actual VCS. Analysis itself is pure; these are the only suspension
//! points of a request.

pub mod diff;

pub use diff::{ChangeType, DiffResult, DiffStats, FileDiff};

use crate::error::{Result, SplitError, VcsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata for a single commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit identifier, in the VCS's own format.
    pub id: String,
    /// Author string.
    pub author: String,
    /// Author timestamp.
    pub timestamp: DateTime<Utc>,
    /// Full commit message.
    pub message: String,
}

/// A single file payload for commit creation. `None` content deletes the
/// file; otherwise the collaborator writes the full post-image content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChange {
    /// Relative file path.
    pub path: String,
    /// Post-image content, or `None` for a deletion.
    pub content: Option<String>,
}

/// The endpoints of a revision range expression.
///
/// The range syntax itself belongs to the VCS; the engine only needs the
/// two endpoint revsets for the proposal it returns. A single revision `R`
/// is treated as the degenerate range `R..R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
    /// The raw range expression as supplied by the caller.
    pub raw: String,
    /// The revision the split starts from.
    pub from: String,
    /// The revision the split reproduces.
    pub to: String,
}

impl RevisionRange {
    /// Parse a range expression into its endpoints.
    pub fn parse(range: &str) -> Result<Self> {
        let trimmed = range.trim();
        if trimmed.is_empty() {
            return Err(SplitError::invalid_input("empty revision range"));
        }
        let (from, to) = match trimmed.split_once("..") {
            Some((from, to)) => {
                if from.is_empty() || to.is_empty() {
                    return Err(SplitError::Vcs(VcsError::InvalidRange {
                        range: range.to_string(),
                    }));
                }
                (from.to_string(), to.to_string())
            }
            None => (trimmed.to_string(), trimmed.to_string()),
        };
        Ok(Self {
            raw: trimmed.to_string(),
            from,
            to,
        })
    }
}

/// The repository-level interface the engine consumes.
///
/// Implementations wrap one repository. `init` validates the path before
/// any other call; every method may fail with a [`VcsError`].
pub trait Vcs {
    /// Bind to a repository at `path`. Fails with
    /// [`VcsError::NotARepository`] when the path lacks VCS metadata.
    fn init(&mut self, path: &Path) -> Result<()>;

    /// The union patch for a revision range, with per-file change kinds.
    fn diff_range(&self, range: &str) -> Result<DiffResult>;

    /// Up to `limit` commits reachable from `reference`, newest first.
    fn commit_history(&self, limit: usize, reference: &str) -> Result<Vec<CommitInfo>>;

    /// Metadata for a single commit.
    fn commit_info(&self, id: &str) -> Result<CommitInfo>;

    /// The paths touched by a commit.
    fn commit_files(&self, id: &str) -> Result<Vec<String>>;

    /// Apply `changes` and record a new commit carrying `message`.
    /// Returns the new commit identifier.
    fn create_commit(&mut self, message: &str, changes: &[CommitChange]) -> Result<String>;
}

/// Source of post-image file content for commit realization.
///
/// The realizer never passes raw diff text to the collaborator; the caller
/// supplies the content each path should have after the split. `None`
/// means the path does not exist in the post-image.
pub trait ContentSource {
    /// Post-image content for `path`, or `None` when absent.
    fn content(&self, path: &str) -> Option<String>;
}

impl ContentSource for std::collections::BTreeMap<String, String> {
    fn content(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

impl ContentSource for std::collections::HashMap<String, String> {
    fn content(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}
