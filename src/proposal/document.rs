// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The serialized proposal document.
//!
//! The declarative shape handed back to callers: camelCase field names,
//! per-commit stats, and an aggregate summary with per-kind counts.

use serde::Serialize;

use crate::analysis::ChangeKind;
use crate::proposal::model::{CommitDivisionProposal, ProposedCommit};
use crate::vcs::diff::count_patch_lines;
use crate::vcs::ChangeType;

/// Top-level proposal document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    /// The revision range the proposal covers.
    pub original_commit_range: String,
    /// The proposed commits, possibly truncated to `maxCommits`.
    pub proposed_commits: Vec<CommitDocument>,
    /// Mean confidence of the selected patterns.
    pub confidence_score: f64,
    /// Total number of files across the shown commits.
    pub total_files: usize,
    /// Aggregate change statistics.
    pub stats: DocumentStats,
    /// Proposal summary.
    pub summary: DocumentSummary,
}

/// One proposed commit in the document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDocument {
    /// Conventional-commit formatted message.
    pub message: String,
    /// The commit's change kind.
    pub change_type: ChangeKind,
    /// Keywords binding the commit, lexicographic.
    pub keywords: Vec<String>,
    /// Member files.
    pub changes: Vec<ChangeDocument>,
    /// Per-commit statistics.
    pub stats: CommitStats,
}

/// One file change in the document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDocument {
    /// Relative file path.
    pub path: String,
    /// Kind of change for this file.
    pub change_type: ChangeType,
    /// Pattern tags the file matched.
    pub affected_groups: Vec<usize>,
}

/// Per-commit statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    /// Number of files in the commit.
    pub files_count: usize,
    /// The commit's change kind.
    pub change_type: ChangeKind,
}

/// Aggregate file and line statistics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub files_added: usize,
    pub files_modified: usize,
    pub files_deleted: usize,
    pub files_renamed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

/// Proposal summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Commits before truncation.
    pub total_commits: usize,
    /// Commits present in the document.
    pub shown_commits: usize,
    /// Mean confidence of the selected patterns.
    pub mean_confidence: f64,
    /// Commit counts per change kind.
    pub commit_types: CommitTypeCounts,
}

/// Per-kind commit counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitTypeCounts {
    pub feature: usize,
    pub bugfix: usize,
    pub refactor: usize,
    pub docs: usize,
    pub tests: usize,
    pub chore: usize,
    pub style: usize,
    pub performance: usize,
}

impl CommitTypeCounts {
    fn count(commits: &[ProposedCommit]) -> Self {
        let mut counts = Self::default();
        for commit in commits {
            match commit.kind {
                ChangeKind::Feature => counts.feature += 1,
                ChangeKind::Bugfix => counts.bugfix += 1,
                ChangeKind::Refactor => counts.refactor += 1,
                ChangeKind::Docs => counts.docs += 1,
                ChangeKind::Tests => counts.tests += 1,
                ChangeKind::Chore => counts.chore += 1,
                ChangeKind::Style => counts.style += 1,
                ChangeKind::Performance => counts.performance += 1,
            }
        }
        counts
    }
}

impl ProposalDocument {
    /// Build the document for a (possibly truncated) proposal.
    /// `total_commits` is the commit count before truncation.
    pub fn new(proposal: &CommitDivisionProposal, total_commits: usize) -> Self {
        let mut stats = DocumentStats::default();
        for commit in &proposal.commits {
            for change in &commit.changes {
                match change.change_type {
                    ChangeType::Add => stats.files_added += 1,
                    ChangeType::Modify => stats.files_modified += 1,
                    ChangeType::Delete => stats.files_deleted += 1,
                    ChangeType::Rename => stats.files_renamed += 1,
                }
                let (added, removed) = count_patch_lines(&change.patch);
                stats.lines_added += added;
                stats.lines_removed += removed;
            }
        }

        let proposed_commits: Vec<CommitDocument> = proposal
            .commits
            .iter()
            .map(|commit| CommitDocument {
                message: commit.message.clone(),
                change_type: commit.kind,
                keywords: commit.keywords.clone(),
                changes: commit
                    .changes
                    .iter()
                    .map(|change| ChangeDocument {
                        path: change.path.clone(),
                        change_type: change.change_type,
                        affected_groups: change.similarity_groups.iter().copied().collect(),
                    })
                    .collect(),
                stats: CommitStats {
                    files_count: commit.changes.len(),
                    change_type: commit.kind,
                },
            })
            .collect();

        Self {
            original_commit_range: proposal.range.clone(),
            confidence_score: proposal.confidence,
            total_files: proposal.total_files,
            stats,
            summary: DocumentSummary {
                total_commits,
                shown_commits: proposal.commits.len(),
                mean_confidence: proposal.confidence,
                commit_types: CommitTypeCounts::count(&proposal.commits),
            },
            proposed_commits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::model::FileChange;
    use std::collections::BTreeSet;

    fn sample_proposal() -> CommitDivisionProposal {
        CommitDivisionProposal {
            range: "base..tip".to_string(),
            original_revision: "base".to_string(),
            target_revision: "tip".to_string(),
            commits: vec![ProposedCommit {
                message: "feat(src): New feature in src".to_string(),
                kind: ChangeKind::Feature,
                keywords: vec!["widget".to_string()],
                changes: vec![FileChange {
                    path: "src/a.rs".to_string(),
                    change_type: ChangeType::Add,
                    patch: "+widget()\n".to_string(),
                    similarity_groups: BTreeSet::from([0, 2]),
                }],
                confidence: 0.9,
            }],
            total_files: 1,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_document_shape() {
        let doc = ProposalDocument::new(&sample_proposal(), 3);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["originalCommitRange"], "base..tip");
        assert_eq!(json["summary"]["totalCommits"], 3);
        assert_eq!(json["summary"]["shownCommits"], 1);
        assert_eq!(json["summary"]["commitTypes"]["feature"], 1);
        assert_eq!(json["proposedCommits"][0]["changeType"], "feature");
        assert_eq!(json["proposedCommits"][0]["stats"]["filesCount"], 1);
        assert_eq!(
            json["proposedCommits"][0]["changes"][0]["affectedGroups"],
            serde_json::json!([0, 2])
        );
        assert_eq!(json["proposedCommits"][0]["changes"][0]["changeType"], "add");
    }

    #[test]
    fn test_document_stats_count_lines_and_files() {
        let doc = ProposalDocument::new(&sample_proposal(), 1);
        assert_eq!(doc.stats.files_added, 1);
        assert_eq!(doc.stats.files_modified, 0);
        assert_eq!(doc.stats.lines_added, 1);
        assert_eq!(doc.stats.lines_removed, 0);
    }
}
