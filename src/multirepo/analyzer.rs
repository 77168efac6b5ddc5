// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Cross-repository dependency inference.
//!
//! Compares the keyword sets of each repository's diffs; a non-empty
//! intersection yields a dependency record. A dependency is an `import`
//! when symbols defined in the target repository appear on the source
//! repository's added lines, otherwise a `reference`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::analysis::{extract_keywords, extract_symbols};
use crate::vcs::FileDiff;

/// Upper bound for inferred cross-repo confidence.
const CONFIDENCE_CAP: f64 = 0.95;

/// Kind of a cross-repository dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDependencyKind {
    /// The source uses symbols defined by the target.
    Import,
    /// The repositories share identifiers without a detected symbol use.
    Reference,
}

/// An inferred dependency between two repositories.
#[derive(Debug, Clone, Serialize)]
pub struct CrossRepoDependency {
    /// The depending repository.
    pub source: String,
    /// The repository depended on.
    pub target: String,
    /// Import or reference.
    pub kind: CrossDependencyKind,
    /// Intersection-derived confidence in [0, 0.95].
    pub confidence: f64,
}

/// Infer dependencies between repositories from their diffs.
///
/// `names` fixes the iteration order; repositories missing from `diffs`
/// contribute empty keyword sets and never produce records.
pub fn analyze_cross_repo(
    diffs: &HashMap<String, Vec<FileDiff>>,
    names: &[String],
) -> Vec<CrossRepoDependency> {
    let keywords: Vec<(&str, BTreeSet<String>)> = names
        .iter()
        .map(|name| (name.as_str(), repo_keywords(diffs.get(name))))
        .collect();
    let added: Vec<(&str, String)> = names
        .iter()
        .map(|name| (name.as_str(), repo_added_lines(diffs.get(name))))
        .collect();
    let symbols: Vec<(&str, Vec<String>)> = names
        .iter()
        .map(|name| (name.as_str(), repo_symbols(diffs.get(name))))
        .collect();

    let mut records = Vec::new();
    for (i, (source, source_keywords)) in keywords.iter().enumerate() {
        for (j, (target, target_keywords)) in keywords.iter().enumerate() {
            if i == j {
                continue;
            }
            let shared = source_keywords.intersection(target_keywords).count();
            if shared == 0 {
                continue;
            }
            let largest = source_keywords.len().max(target_keywords.len());
            let confidence = (shared as f64 / largest as f64).min(CONFIDENCE_CAP);

            let source_added = &added[i].1;
            let kind = if symbols[j]
                .1
                .iter()
                .any(|name| source_added.contains(name.as_str()))
            {
                CrossDependencyKind::Import
            } else {
                CrossDependencyKind::Reference
            };

            records.push(CrossRepoDependency {
                source: source.to_string(),
                target: target.to_string(),
                kind,
                confidence,
            });
        }
    }
    records
}

fn repo_keywords(diffs: Option<&Vec<FileDiff>>) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    for diff in diffs.into_iter().flatten() {
        keywords.extend(extract_keywords(&diff.patch));
    }
    keywords
}

fn repo_added_lines(diffs: Option<&Vec<FileDiff>>) -> String {
    let mut added = String::new();
    for diff in diffs.into_iter().flatten() {
        for line in diff.patch.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                added.push_str(line);
                added.push('\n');
            }
        }
    }
    added
}

fn repo_symbols(diffs: Option<&Vec<FileDiff>>) -> Vec<String> {
    diffs
        .into_iter()
        .flatten()
        .flat_map(|diff| extract_symbols(&diff.path, &diff.patch))
        .map(|symbol| symbol.name)
        .collect()
}
