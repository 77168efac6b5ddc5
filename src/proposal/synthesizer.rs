// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Proposal synthesis.
//!
//! Turns file groups and specialized patterns into a commit division
//! proposal: one conventional commit per selected pattern, each with a
//! derived confidence, plus a fallback commit for anything left
//! unclaimed so that every path lands in exactly one commit.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::analysis::{
    classify_patch, cohesion_score, extract_keywords, patterns::specialized_patterns,
    ChangeKind, ChangePattern,
};
use crate::proposal::message::{describe, keyword_body, CommitMessage};
use crate::proposal::model::{CommitDivisionProposal, FileChange, ProposedCommit};
use crate::vcs::diff::{basename_of, DiffResult, FileDiff};
use crate::vcs::RevisionRange;

/// Base confidence for a synthesized group.
const BASE_CONFIDENCE: f64 = 0.7;
/// Bonus for a fully shared directory, extension, or rich keyword set.
const CONFIDENCE_BONUS: f64 = 0.1;
/// Upper bound for any derived confidence.
const CONFIDENCE_CAP: f64 = 0.95;
/// Keyword count above which the keyword bonus applies.
const KEYWORD_BONUS_THRESHOLD: usize = 3;
/// Confidence assigned to the fallback commit of unclaimed files.
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Derive the confidence of a file group.
///
/// Base 0.7; +0.1 when all files share one directory; +0.1 when all share
/// one extension; +0.1 when more than three keywords bind the group.
/// Capped at 0.95.
pub fn group_confidence(files: &[&FileDiff], keywords: &BTreeSet<String>) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if let Some(first) = files.first() {
        if files.iter().all(|f| f.directory() == first.directory()) {
            confidence += CONFIDENCE_BONUS;
        }
        if files.iter().all(|f| f.extension() == first.extension()) {
            confidence += CONFIDENCE_BONUS;
        }
    }
    if keywords.len() > KEYWORD_BONUS_THRESHOLD {
        confidence += CONFIDENCE_BONUS;
    }
    confidence.min(CONFIDENCE_CAP)
}

/// Build the full pattern list for a diff: specialized path patterns
/// first, then one classified pattern per semantic group, sorted by
/// descending confidence. The sort is stable, so specialized patterns win
/// confidence ties.
pub fn build_patterns(diff: &DiffResult, groups: &[Vec<String>]) -> Vec<ChangePattern> {
    let mut patterns = specialized_patterns(&diff.files, |f| extract_keywords(&f.patch));

    for group in groups {
        let files: Vec<&FileDiff> = group.iter().filter_map(|p| diff.file(p)).collect();
        if files.is_empty() {
            continue;
        }
        let combined: String = files
            .iter()
            .map(|f| f.patch.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let kind = classify_patch(&combined);
        let mut keywords = BTreeSet::new();
        for file in &files {
            keywords.extend(extract_keywords(&file.patch));
        }
        let confidence = group_confidence(&files, &keywords);
        patterns.push(ChangePattern {
            label: format!("Grouped {} changes", kind.as_str()),
            confidence,
            kind,
            files: group.clone(),
            keywords,
        });
    }

    patterns.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    patterns
}

/// Relocate boundary files between groups while doing so increases the
/// combined cohesion of the pair. Runs passes until a full pass makes no
/// change. Groups of size one are never emptied.
pub fn optimize_boundaries(diff: &DiffResult, mut groups: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let file_map: HashMap<&str, &FileDiff> =
        diff.files.iter().map(|f| (f.path.as_str(), f)).collect();
    let keyword_map: HashMap<&str, BTreeSet<String>> = diff
        .files
        .iter()
        .map(|f| (f.path.as_str(), extract_keywords(&f.patch)))
        .collect();

    let cohesion_of = |paths: &[String]| -> f64 {
        let files: Vec<&FileDiff> = paths
            .iter()
            .filter_map(|p| file_map.get(p.as_str()).copied())
            .collect();
        let mut keywords = BTreeSet::new();
        for path in paths {
            if let Some(set) = keyword_map.get(path.as_str()) {
                keywords.extend(set.iter().cloned());
            }
        }
        cohesion_score(&files, &keywords)
    };

    loop {
        let mut changed = false;
        for i in 0..groups.len() {
            for j in 0..groups.len() {
                if i == j || groups[i].len() <= groups[j].len() {
                    continue;
                }
                let candidates = groups[i].clone();
                for path in candidates {
                    if groups[i].len() == 1 {
                        break;
                    }
                    let current = cohesion_of(&groups[i]) + cohesion_of(&groups[j]);
                    let source: Vec<String> = groups[i]
                        .iter()
                        .filter(|p| **p != path)
                        .cloned()
                        .collect();
                    let mut target = groups[j].clone();
                    target.push(path.clone());
                    if cohesion_of(&source) + cohesion_of(&target) > current {
                        groups[i] = source;
                        groups[j] = target;
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    groups.retain(|g| !g.is_empty());
    groups
}

/// Build a commit from its member file changes.
///
/// The message scope is the shared directory's basename when every file
/// agrees on one; the description target is the majority directory.
pub fn commit_from_files(
    kind: ChangeKind,
    changes: Vec<FileChange>,
    confidence: f64,
) -> ProposedCommit {
    let mut keywords = BTreeSet::new();
    for change in &changes {
        keywords.extend(extract_keywords(&change.patch));
    }

    let majority_dir = majority_by(&changes, |c| directory_str(&c.path));
    let target = if majority_dir.is_empty() {
        "project".to_string()
    } else {
        basename_of(&majority_dir).to_string()
    };

    let shared_dir = changes
        .first()
        .map(|first| directory_str(&first.path))
        .filter(|dir| {
            !dir.is_empty() && changes.iter().all(|c| directory_str(&c.path) == *dir)
        });

    let mut message = CommitMessage::new(kind, describe(kind, &target));
    if let Some(dir) = shared_dir {
        message = message.with_scope(basename_of(&dir));
    }
    if let Some(body) = keyword_body(&keywords) {
        message = message.with_body(body);
    }

    ProposedCommit {
        message: message.format(),
        kind,
        keywords: keywords.into_iter().collect(),
        changes,
        confidence,
    }
}

fn directory_str(path: &str) -> String {
    crate::vcs::diff::directory_of(path).to_string()
}

/// The most frequent key over the changes, first-seen on ties.
fn majority_by(changes: &[FileChange], key: impl Fn(&FileChange) -> String) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for change in changes {
        let k = key(change);
        match counts.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, count)) => *count += 1,
            None => counts.push((k, 1)),
        }
    }
    let mut best: Option<(String, usize)> = None;
    for (k, count) in counts {
        let replace = match best {
            Some((_, max)) => count > max,
            None => true,
        };
        if replace {
            best = Some((k, count));
        }
    }
    best.map(|(k, _)| k).unwrap_or_default()
}

/// Synthesize a proposal from a diff and its sorted pattern list.
///
/// Patterns seed commits in confidence order; a file already claimed by
/// an earlier pattern is skipped. Patterns below `min_confidence` do not
/// seed; any files they leave unclaimed fall into a trailing `chore`
/// commit so every path is covered exactly once.
pub fn synthesize(
    diff: &DiffResult,
    range: &RevisionRange,
    patterns: &[ChangePattern],
    min_confidence: f64,
) -> CommitDivisionProposal {
    // Tag every file with the patterns it matched; the strategy
    // transformer regroups by these tags.
    let mut tags: HashMap<&str, BTreeSet<usize>> = HashMap::new();
    for (idx, pattern) in patterns.iter().enumerate() {
        for path in &pattern.files {
            tags.entry(path.as_str()).or_default().insert(idx);
        }
    }

    let file_change = |path: &str| -> Option<FileChange> {
        diff.file(path).map(|f| FileChange {
            path: f.path.clone(),
            change_type: f.change_type,
            patch: f.patch.clone(),
            similarity_groups: tags.get(path).cloned().unwrap_or_default(),
        })
    };

    let mut assigned: HashSet<&str> = HashSet::new();
    let mut commits = Vec::new();

    for pattern in patterns {
        if pattern.confidence < min_confidence {
            continue;
        }
        let unclaimed: Vec<&str> = pattern
            .files
            .iter()
            .map(String::as_str)
            .filter(|p| !assigned.contains(p))
            .collect();
        if unclaimed.is_empty() {
            continue;
        }
        let changes: Vec<FileChange> = unclaimed
            .iter()
            .filter_map(|p| file_change(p))
            .collect();
        for path in unclaimed {
            assigned.insert(path);
        }
        commits.push(commit_from_files(pattern.kind, changes, pattern.confidence));
    }

    let leftover: Vec<FileChange> = diff
        .files
        .iter()
        .filter(|f| !assigned.contains(f.path.as_str()))
        .filter_map(|f| file_change(&f.path))
        .collect();
    if !leftover.is_empty() {
        commits.push(commit_from_files(
            ChangeKind::Chore,
            leftover,
            FALLBACK_CONFIDENCE,
        ));
    }

    let total_files = commits.iter().map(|c| c.changes.len()).sum();
    let confidence = mean_confidence(&commits);

    CommitDivisionProposal {
        range: range.raw.clone(),
        original_revision: range.from.clone(),
        target_revision: range.to.clone(),
        commits,
        total_files,
        confidence,
    }
}

/// Mean confidence over a commit list; zero when empty.
pub fn mean_confidence(commits: &[ProposedCommit]) -> f64 {
    if commits.is_empty() {
        return 0.0;
    }
    commits.iter().map(|c| c.confidence).sum::<f64>() / commits.len() as f64
}
