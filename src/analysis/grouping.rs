// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Semantic grouping of changed files.
//!
//! A single-pass expansion over the dependency graph: each unprocessed
//! file with neighbors seeds a group of itself plus its unclaimed
//! out-neighbors. The expansion is deliberately non-transitive; a later
//! seed does not pull in the closure of its neighbors' neighbors.
//! Remaining files become singleton groups. Iteration follows the diff's
//! file order, so the partition is deterministic.

use std::collections::HashSet;

use super::dependencies::DependencyGraph;
use crate::vcs::diff::DiffResult;

/// Partition the diff's paths into semantic groups.
pub fn group_files(diff: &DiffResult, graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut processed: HashSet<&str> = HashSet::new();

    for file in &diff.files {
        let path = file.path.as_str();
        if processed.contains(path) {
            continue;
        }
        let neighbors = graph.neighbors(path);
        if neighbors.is_empty() {
            continue;
        }
        let mut group = vec![path.to_string()];
        processed.insert(path);
        for neighbor in neighbors {
            if processed.insert(neighbor.as_str()) {
                group.push(neighbor.clone());
            }
        }
        groups.push(group);
    }

    for file in &diff.files {
        let path = file.path.as_str();
        if processed.insert(path) {
            groups.push(vec![path.to_string()]);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dependencies::analyze_dependencies;
    use crate::vcs::diff::{ChangeType, FileDiff};

    fn diff_of(files: Vec<(&str, &str)>) -> DiffResult {
        DiffResult::new(
            "a..b",
            files
                .into_iter()
                .map(|(path, patch)| FileDiff::new(path, ChangeType::Modify, patch))
                .collect(),
        )
    }

    #[test]
    fn test_related_files_grouped() {
        let diff = diff_of(vec![
            ("src/a.nim", "+widget()\n"),
            ("src/b.nim", "+widget()\n"),
            ("docs/README.md", "+overview\n"),
        ]);
        let graph = analyze_dependencies(&diff);
        let groups = group_files(&diff, &graph);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec!["src/a.nim", "src/b.nim"]);
        assert_eq!(groups[1], vec!["docs/README.md"]);
    }

    #[test]
    fn test_grouping_is_non_transitive() {
        // a ~ b and b ~ c, but a and c share nothing. The first seed takes
        // a and b; c stays alone instead of joining through b.
        let diff = diff_of(vec![
            ("a.nim", "+alpha()\n"),
            ("b.nim", "+alpha()\n+gamma()\n"),
            ("c.nim", "+gamma()\n"),
        ]);
        let graph = analyze_dependencies(&diff);
        let groups = group_files(&diff, &graph);
        assert_eq!(groups, vec![vec!["a.nim", "b.nim"], vec!["c.nim"]]);
    }

    #[test]
    fn test_grouping_covers_every_path_once() {
        let diff = diff_of(vec![
            ("a.nim", "+alpha()\n"),
            ("b.nim", "+alpha()\n+gamma()\n"),
            ("c.nim", "+gamma()\n"),
            ("d.nim", "+delta()\n"),
        ]);
        let graph = analyze_dependencies(&diff);
        let groups = group_files(&diff, &graph);
        let mut seen = HashSet::new();
        for group in &groups {
            for path in group {
                assert!(seen.insert(path.clone()), "{path} appears twice");
            }
        }
        assert_eq!(seen.len(), diff.files.len());
    }

    #[test]
    fn test_all_singletons_when_no_edges() {
        let diff = diff_of(vec![("a.nim", "+one()\n"), ("b.nim", "+two()\n")]);
        let graph = analyze_dependencies(&diff);
        let groups = group_files(&diff, &graph);
        assert_eq!(groups, vec![vec!["a.nim"], vec!["b.nim"]]);
    }
}
