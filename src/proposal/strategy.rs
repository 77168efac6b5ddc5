// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Division strategies and commit size preferences.
//!
//! The transformer rebuilds a base proposal under the requested strategy
//! and size preference. Regrouped commits are reclassified through the
//! pattern classifier so their kinds reflect the new grouping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::{classify_patch, ChangeKind};
use crate::error::{Result, SplitError};
use crate::proposal::message::{merge_message, CommitMessage};
use crate::proposal::model::{CommitDivisionProposal, FileChange, ProposedCommit};
use crate::proposal::synthesizer::{commit_from_files, group_confidence, mean_confidence};
use crate::vcs::diff::{basename_of, directory_of, extension_of, FileDiff};

/// How commits are regrouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DivisionStrategy {
    /// Keep the synthesizer's grouping.
    #[default]
    Balanced,
    /// Regroup by similarity-tag overlap.
    SemanticCentric,
    /// Regroup by file extension.
    FileTypeCentric,
    /// Regroup by directory.
    DirectoryCentric,
}

impl std::str::FromStr for DivisionStrategy {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(DivisionStrategy::Balanced),
            "semantic" | "semanticcentric" => Ok(DivisionStrategy::SemanticCentric),
            "filetype" | "filetypecentric" => Ok(DivisionStrategy::FileTypeCentric),
            "directory" | "directorycentric" => Ok(DivisionStrategy::DirectoryCentric),
            _ => Err(SplitError::invalid_input(format!(
                "invalid division strategy: '{s}'"
            ))),
        }
    }
}

/// How commit sizes are shaped after grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitSizePreference {
    /// Keep commit sizes as grouped.
    #[default]
    Balanced,
    /// Split large commits by directory.
    Many,
    /// Merge small commits by kind.
    Few,
}

impl std::str::FromStr for CommitSizePreference {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(CommitSizePreference::Balanced),
            "many" => Ok(CommitSizePreference::Many),
            "few" => Ok(CommitSizePreference::Few),
            _ => Err(SplitError::invalid_input(format!(
                "invalid commit size preference: '{s}'"
            ))),
        }
    }
}

/// Commits holding more changes than this are split under `Many`.
const SPLIT_THRESHOLD: usize = 5;
/// Commits holding fewer changes than this are merged under `Few`.
const MERGE_THRESHOLD: usize = 3;

/// Apply a strategy and size preference to a proposal.
pub fn transform(
    proposal: CommitDivisionProposal,
    strategy: DivisionStrategy,
    size: CommitSizePreference,
) -> CommitDivisionProposal {
    let proposal = apply_strategy(proposal, strategy);
    apply_size(proposal, size)
}

/// Rebuild a proposal under a division strategy.
pub fn apply_strategy(
    proposal: CommitDivisionProposal,
    strategy: DivisionStrategy,
) -> CommitDivisionProposal {
    match strategy {
        DivisionStrategy::Balanced => proposal,
        DivisionStrategy::SemanticCentric => regroup(proposal, semantic_buckets),
        DivisionStrategy::FileTypeCentric => regroup(proposal, file_type_buckets),
        DivisionStrategy::DirectoryCentric => regroup(proposal, directory_buckets),
    }
}

/// Reshape commit sizes under a size preference.
pub fn apply_size(
    proposal: CommitDivisionProposal,
    size: CommitSizePreference,
) -> CommitDivisionProposal {
    match size {
        CommitSizePreference::Balanced => proposal,
        CommitSizePreference::Many => split_large_commits(proposal),
        CommitSizePreference::Few => merge_small_commits(proposal),
    }
}

fn rebuild(proposal: CommitDivisionProposal, commits: Vec<ProposedCommit>) -> CommitDivisionProposal {
    let total_files = commits.iter().map(|c| c.changes.len()).sum();
    let confidence = mean_confidence(&commits);
    CommitDivisionProposal {
        range: proposal.range,
        original_revision: proposal.original_revision,
        target_revision: proposal.target_revision,
        commits,
        total_files,
        confidence,
    }
}

fn flatten(proposal: &mut CommitDivisionProposal) -> Vec<FileChange> {
    proposal
        .commits
        .drain(..)
        .flat_map(|c| c.changes)
        .collect()
}

fn regroup(
    mut proposal: CommitDivisionProposal,
    buckets: fn(Vec<FileChange>) -> Vec<RegroupedBucket>,
) -> CommitDivisionProposal {
    let changes = flatten(&mut proposal);
    let commits = buckets(changes)
        .into_iter()
        .map(|bucket| bucket.into_commit())
        .collect();
    rebuild(proposal, commits)
}

/// A regrouped block of changes and how its commit is derived.
struct RegroupedBucket {
    changes: Vec<FileChange>,
    /// Fixed message for path-shaped buckets; `None` reclassifies and
    /// synthesizes from the kind templates.
    fixed: Option<(ChangeKind, String)>,
}

impl RegroupedBucket {
    fn into_commit(self) -> ProposedCommit {
        let confidence = bucket_confidence(&self.changes);
        match self.fixed {
            Some((kind, message)) => {
                let mut keywords = BTreeSet::new();
                for change in &self.changes {
                    keywords.extend(crate::analysis::extract_keywords(&change.patch));
                }
                ProposedCommit {
                    message,
                    kind,
                    keywords: keywords.into_iter().collect(),
                    changes: self.changes,
                    confidence,
                }
            }
            None => {
                let combined: String = self
                    .changes
                    .iter()
                    .map(|c| c.patch.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                let kind = classify_patch(&combined);
                commit_from_files(kind, self.changes, confidence)
            }
        }
    }
}

fn bucket_confidence(changes: &[FileChange]) -> f64 {
    let files: Vec<FileDiff> = changes
        .iter()
        .map(|c| FileDiff::new(c.path.clone(), c.change_type, c.patch.clone()))
        .collect();
    let refs: Vec<&FileDiff> = files.iter().collect();
    let mut keywords = BTreeSet::new();
    for change in changes {
        keywords.extend(crate::analysis::extract_keywords(&change.patch));
    }
    group_confidence(&refs, &keywords)
}

/// Regroup by similarity-tag overlap: a change joins the first bucket it
/// shares a tag with, widening that bucket's tag set.
fn semantic_buckets(changes: Vec<FileChange>) -> Vec<RegroupedBucket> {
    let mut buckets: Vec<(BTreeSet<usize>, Vec<FileChange>)> = Vec::new();
    for change in changes {
        match buckets
            .iter_mut()
            .find(|(tags, _)| !tags.is_disjoint(&change.similarity_groups))
        {
            Some((tags, members)) => {
                tags.extend(change.similarity_groups.iter().copied());
                members.push(change);
            }
            None => {
                let tags = change.similarity_groups.clone();
                buckets.push((tags, vec![change]));
            }
        }
    }
    buckets
        .into_iter()
        .map(|(_, changes)| RegroupedBucket {
            changes,
            fixed: None,
        })
        .collect()
}

/// Regroup by file extension; extensionless files bucket as `misc`.
fn file_type_buckets(changes: Vec<FileChange>) -> Vec<RegroupedBucket> {
    let mut buckets: Vec<(String, Vec<FileChange>)> = Vec::new();
    for change in changes {
        let ext = extension_of(&change.path);
        let label = if ext.is_empty() { "misc" } else { ext }.to_string();
        match buckets.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, members)) => members.push(change),
            None => buckets.push((label, vec![change])),
        }
    }
    buckets
        .into_iter()
        .map(|(ext, changes)| RegroupedBucket {
            fixed: Some((ChangeKind::Chore, format!("chore: update {ext} files"))),
            changes,
        })
        .collect()
}

/// Regroup by full directory.
fn directory_buckets(changes: Vec<FileChange>) -> Vec<RegroupedBucket> {
    let mut buckets: Vec<(String, Vec<FileChange>)> = Vec::new();
    for change in changes {
        let dir = directory_of(&change.path).to_string();
        match buckets.iter_mut().find(|(existing, _)| *existing == dir) {
            Some((_, members)) => members.push(change),
            None => buckets.push((dir, vec![change])),
        }
    }
    buckets
        .into_iter()
        .map(|(dir, changes)| {
            let message = if dir.is_empty() {
                "chore: update files in root directory".to_string()
            } else {
                format!("chore: update files in {dir}")
            };
            RegroupedBucket {
                fixed: Some((ChangeKind::Chore, message)),
                changes,
            }
        })
        .collect()
}

/// Split any commit holding more than [`SPLIT_THRESHOLD`] changes into
/// per-directory commits, each inheriting the parent message with the
/// directory basename as its scope.
fn split_large_commits(mut proposal: CommitDivisionProposal) -> CommitDivisionProposal {
    let mut out = Vec::new();
    for commit in proposal.commits.drain(..) {
        if commit.changes.len() <= SPLIT_THRESHOLD {
            out.push(commit);
            continue;
        }
        let mut by_dir: Vec<(String, Vec<FileChange>)> = Vec::new();
        for change in commit.changes {
            let dir = directory_of(&change.path).to_string();
            match by_dir.iter_mut().find(|(existing, _)| *existing == dir) {
                Some((_, members)) => members.push(change),
                None => by_dir.push((dir, vec![change])),
            }
        }
        for (dir, changes) in by_dir {
            let scope = if dir.is_empty() {
                "root".to_string()
            } else {
                basename_of(&dir).to_string()
            };
            let message = match CommitMessage::parse(&commit.message) {
                Ok(parsed) => {
                    let mut scoped = CommitMessage::new(parsed.kind, parsed.description);
                    scoped = scoped.with_scope(scope);
                    if let Some(body) = parsed.body {
                        scoped = scoped.with_body(body);
                    }
                    scoped.format()
                }
                Err(_) => commit.message.clone(),
            };
            out.push(ProposedCommit {
                message,
                kind: commit.kind,
                keywords: commit.keywords.clone(),
                changes,
                confidence: commit.confidence,
            });
        }
    }
    rebuild(proposal, out)
}

/// Merge commits holding fewer than [`MERGE_THRESHOLD`] changes by kind.
/// A kind bucket of one small commit is preserved unchanged; merged
/// buckets receive the fixed per-kind merge message.
fn merge_small_commits(mut proposal: CommitDivisionProposal) -> CommitDivisionProposal {
    let mut preserved = Vec::new();
    let mut small: Vec<ProposedCommit> = Vec::new();
    for commit in proposal.commits.drain(..) {
        if commit.changes.len() < MERGE_THRESHOLD {
            small.push(commit);
        } else {
            preserved.push(commit);
        }
    }

    for kind in ChangeKind::ALL {
        let bucket: Vec<ProposedCommit> =
            small.iter().filter(|c| c.kind == kind).cloned().collect();
        match bucket.len() {
            0 => {}
            1 => preserved.push(bucket.into_iter().next().unwrap()),
            _ => {
                let confidence =
                    bucket.iter().map(|c| c.confidence).sum::<f64>() / bucket.len() as f64;
                let mut keywords = BTreeSet::new();
                let mut changes = Vec::new();
                for commit in bucket {
                    keywords.extend(commit.keywords);
                    changes.extend(commit.changes);
                }
                preserved.push(ProposedCommit {
                    message: merge_message(kind),
                    kind,
                    keywords: keywords.into_iter().collect(),
                    changes,
                    confidence,
                });
            }
        }
    }

    rebuild(proposal, preserved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::ChangeType;

    fn change(path: &str, tags: &[usize]) -> FileChange {
        FileChange {
            path: path.to_string(),
            change_type: ChangeType::Modify,
            patch: format!("+touch {}\n", path.replace('/', "_").replace('.', "_")),
            similarity_groups: tags.iter().copied().collect(),
        }
    }

    fn commit(kind: ChangeKind, message: &str, changes: Vec<FileChange>) -> ProposedCommit {
        ProposedCommit {
            message: message.to_string(),
            kind,
            keywords: vec![],
            changes,
            confidence: 0.8,
        }
    }

    fn proposal(commits: Vec<ProposedCommit>) -> CommitDivisionProposal {
        let total_files = commits.iter().map(|c| c.changes.len()).sum();
        let confidence = mean_confidence(&commits);
        CommitDivisionProposal {
            range: "base..tip".to_string(),
            original_revision: "base".to_string(),
            target_revision: "tip".to_string(),
            commits,
            total_files,
            confidence,
        }
    }

    #[test]
    fn test_strategy_tokens() {
        assert_eq!(
            "semanticCentric".parse::<DivisionStrategy>().unwrap(),
            DivisionStrategy::SemanticCentric
        );
        assert_eq!(
            "directory".parse::<DivisionStrategy>().unwrap(),
            DivisionStrategy::DirectoryCentric
        );
        assert!("bogus".parse::<DivisionStrategy>().is_err());
        assert!("bogus".parse::<CommitSizePreference>().is_err());
    }

    #[test]
    fn test_balanced_is_identity() {
        let p = proposal(vec![commit(
            ChangeKind::Feature,
            "feat: something",
            vec![change("src/a.rs", &[0])],
        )]);
        let out = transform(p.clone(), DivisionStrategy::Balanced, CommitSizePreference::Balanced);
        assert_eq!(out.commits.len(), p.commits.len());
        assert_eq!(out.commits[0].message, "feat: something");
    }

    #[test]
    fn test_file_type_centric_buckets_by_extension() {
        let p = proposal(vec![commit(
            ChangeKind::Feature,
            "feat: mixed",
            vec![
                change("src/a.rs", &[0]),
                change("src/b.rs", &[0]),
                change("docs/c.md", &[1]),
            ],
        )]);
        let out = apply_strategy(p, DivisionStrategy::FileTypeCentric);
        assert_eq!(out.commits.len(), 2);
        assert_eq!(out.commits[0].message, "chore: update rs files");
        assert_eq!(out.commits[1].message, "chore: update md files");
        assert_eq!(out.commits[0].kind, ChangeKind::Chore);
    }

    #[test]
    fn test_file_type_centric_extensionless_is_misc() {
        let p = proposal(vec![commit(
            ChangeKind::Chore,
            "chore: stuff",
            vec![change("Makefile", &[0])],
        )]);
        let out = apply_strategy(p, DivisionStrategy::FileTypeCentric);
        assert_eq!(out.commits[0].message, "chore: update misc files");
    }

    #[test]
    fn test_directory_centric_buckets_by_directory() {
        let p = proposal(vec![commit(
            ChangeKind::Feature,
            "feat: mixed",
            vec![
                change("src/a/x.rs", &[0]),
                change("src/a/y.rs", &[0]),
                change("top.rs", &[1]),
            ],
        )]);
        let out = apply_strategy(p, DivisionStrategy::DirectoryCentric);
        assert_eq!(out.commits.len(), 2);
        assert_eq!(out.commits[0].message, "chore: update files in src/a");
        assert_eq!(out.commits[1].message, "chore: update files in root directory");
    }

    #[test]
    fn test_semantic_centric_regroups_by_tag_overlap() {
        let p = proposal(vec![
            commit(
                ChangeKind::Feature,
                "feat: one",
                vec![change("src/a.rs", &[0, 1]), change("src/b.rs", &[1])],
            ),
            commit(
                ChangeKind::Chore,
                "chore: two",
                vec![change("src/c.rs", &[2])],
            ),
        ]);
        let out = apply_strategy(p, DivisionStrategy::SemanticCentric);
        assert_eq!(out.commits.len(), 2);
        assert_eq!(out.commits[0].changes.len(), 2);
        assert_eq!(out.commits[1].changes.len(), 1);
    }

    #[test]
    fn test_many_splits_large_commit_by_directory() {
        let changes: Vec<FileChange> = (0..4)
            .map(|i| change(&format!("src/a/f{i}.rs"), &[0]))
            .chain((0..3).map(|i| change(&format!("src/b/g{i}.rs"), &[0])))
            .collect();
        let p = proposal(vec![commit(ChangeKind::Feature, "feat: big feature", changes)]);
        let out = apply_size(p, CommitSizePreference::Many);
        assert_eq!(out.commits.len(), 2);
        assert_eq!(out.commits[0].message, "feat(a): big feature");
        assert_eq!(out.commits[1].message, "feat(b): big feature");
        assert_eq!(out.commits[0].changes.len(), 4);
        assert_eq!(out.commits[1].changes.len(), 3);
    }

    #[test]
    fn test_many_keeps_small_commits() {
        let p = proposal(vec![commit(
            ChangeKind::Feature,
            "feat: small",
            vec![change("src/a.rs", &[0])],
        )]);
        let out = apply_size(p, CommitSizePreference::Many);
        assert_eq!(out.commits.len(), 1);
        assert_eq!(out.commits[0].message, "feat: small");
    }

    #[test]
    fn test_few_merges_small_commits_of_same_kind() {
        let p = proposal(vec![
            commit(ChangeKind::Feature, "feat: one", vec![change("a.rs", &[0])]),
            commit(ChangeKind::Feature, "feat: two", vec![change("b.rs", &[1])]),
            commit(
                ChangeKind::Docs,
                "docs: three",
                vec![change("c.md", &[2])],
            ),
        ]);
        let out = apply_size(p, CommitSizePreference::Few);
        assert_eq!(out.commits.len(), 2);
        let merged = out
            .commits
            .iter()
            .find(|c| c.kind == ChangeKind::Feature)
            .unwrap();
        assert_eq!(merged.message, "feat: combine multiple feature changes");
        assert_eq!(merged.changes.len(), 2);
        // The lone docs commit is preserved as-is.
        let docs = out.commits.iter().find(|c| c.kind == ChangeKind::Docs).unwrap();
        assert_eq!(docs.message, "docs: three");
    }

    #[test]
    fn test_few_preserves_large_commits() {
        let big: Vec<FileChange> = (0..3).map(|i| change(&format!("src/f{i}.rs"), &[0])).collect();
        let p = proposal(vec![
            commit(ChangeKind::Feature, "feat: big", big),
            commit(ChangeKind::Feature, "feat: small", vec![change("x.rs", &[1])]),
        ]);
        let out = apply_size(p, CommitSizePreference::Few);
        assert_eq!(out.commits.len(), 2);
        assert!(out.commits.iter().any(|c| c.message == "feat: big"));
        assert!(out.commits.iter().any(|c| c.message == "feat: small"));
    }

    #[test]
    fn test_transform_preserves_file_count() {
        let p = proposal(vec![
            commit(
                ChangeKind::Feature,
                "feat: one",
                vec![change("src/a.rs", &[0]), change("docs/b.md", &[0])],
            ),
            commit(ChangeKind::Chore, "chore: two", vec![change("c.toml", &[1])]),
        ]);
        for strategy in [
            DivisionStrategy::Balanced,
            DivisionStrategy::SemanticCentric,
            DivisionStrategy::FileTypeCentric,
            DivisionStrategy::DirectoryCentric,
        ] {
            for size in [
                CommitSizePreference::Balanced,
                CommitSizePreference::Many,
                CommitSizePreference::Few,
            ] {
                let out = transform(p.clone(), strategy, size);
                assert_eq!(out.total_files, 3, "{strategy:?}/{size:?}");
            }
        }
    }
}
