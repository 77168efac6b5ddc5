// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! File dependency inference over keyword intersections.
//!
//! Two files are considered related when their keyword sets intersect.
//! Adjacency lists keep the diff's file order so every downstream
//! traversal is deterministic.

use std::collections::{BTreeSet, HashMap};

use super::keywords::extract_keywords;
use crate::vcs::diff::DiffResult;

/// Directed dependency edges between file paths. Symmetric by
/// construction but stored as adjacency for downstream use.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// The out-neighbors of a path, in diff order. Empty when unknown.
    pub fn neighbors(&self, path: &str) -> &[String] {
        self.edges.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the graph holds any edge at all.
    pub fn is_empty(&self) -> bool {
        self.edges.values().all(Vec::is_empty)
    }
}

/// Build the dependency graph of a diff.
///
/// For each ordered pair of distinct files, an edge is emitted when their
/// keyword sets intersect.
pub fn analyze_dependencies(diff: &DiffResult) -> DependencyGraph {
    let keyword_sets = file_keywords(diff);
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();

    for (path, keywords) in &keyword_sets {
        let neighbors = keyword_sets
            .iter()
            .filter(|(other, other_keywords)| {
                other != path && !keywords.is_disjoint(other_keywords)
            })
            .map(|(other, _)| other.clone())
            .collect();
        edges.insert(path.clone(), neighbors);
    }

    DependencyGraph { edges }
}

/// Extract the keyword set of every file, in diff order.
pub fn file_keywords(diff: &DiffResult) -> Vec<(String, BTreeSet<String>)> {
    diff.files
        .iter()
        .map(|f| (f.path.clone(), extract_keywords(&f.patch)))
        .collect()
}
