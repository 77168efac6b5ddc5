// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Proposal-side data model.
//!
//! Built by the synthesizer, possibly rebuilt by the strategy
//! transformer, returned to the caller, and consumed by the realizer.

use std::collections::BTreeSet;

use crate::analysis::ChangeKind;
use crate::error::{Result, SplitError};
use crate::vcs::{ChangeType, CommitChange, ContentSource};

/// A single file inside a proposed commit.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Relative file path.
    pub path: String,
    /// Kind of change for this file.
    pub change_type: ChangeType,
    /// The file's patch text.
    pub patch: String,
    /// Tags of the patterns this file matched. Implementation-private;
    /// only the strategy transformer reads them.
    pub similarity_groups: BTreeSet<usize>,
}

/// One proposed commit of the division.
#[derive(Debug, Clone)]
pub struct ProposedCommit {
    /// Conventional-commit formatted message.
    pub message: String,
    /// The commit's change kind.
    pub kind: ChangeKind,
    /// Identifiers shared by the member files, lexicographic.
    pub keywords: Vec<String>,
    /// Member files. Every path appears in exactly one commit across a
    /// proposal.
    pub changes: Vec<FileChange>,
    /// Derived confidence of the seeding pattern.
    pub confidence: f64,
}

impl ProposedCommit {
    /// Resolve this commit's post-image payload from a content source.
    ///
    /// Deletions map to `None` content; every other change requires the
    /// source to supply the path's content.
    pub fn to_commit_changes(&self, contents: &dyn ContentSource) -> Result<Vec<CommitChange>> {
        self.changes
            .iter()
            .map(|change| {
                let content = match change.change_type {
                    ChangeType::Delete => None,
                    _ => Some(contents.content(&change.path).ok_or_else(|| {
                        SplitError::invalid_input(format!(
                            "no post-image content for '{}'",
                            change.path
                        ))
                    })?),
                };
                Ok(CommitChange {
                    path: change.path.clone(),
                    content,
                })
            })
            .collect()
    }
}

/// A complete division proposal for one revision range.
#[derive(Debug, Clone)]
pub struct CommitDivisionProposal {
    /// The raw revision range the proposal covers.
    pub range: String,
    /// The revision the split starts from.
    pub original_revision: String,
    /// The revision the split reproduces.
    pub target_revision: String,
    /// The proposed commits, in realization order.
    pub commits: Vec<ProposedCommit>,
    /// Total number of files across all commits.
    pub total_files: usize,
    /// Mean confidence of the selected patterns; zero when empty.
    pub confidence: f64,
}
