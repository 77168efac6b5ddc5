// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Change-kind taxonomy and pattern classification.
//!
//! The classifier scores a patch against a table of keyword rules; the
//! specialized path predicates recognize documentation, test and
//! configuration changes directly from file paths. Both tables are data so
//! their exact behavior can be asserted in tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::vcs::diff::{extension_of, file_name_of, FileDiff};

/// The closed set of change kinds.
///
/// Declaration order doubles as the deterministic tie-break order when
/// classification scores tie.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Feature,
    Bugfix,
    Refactor,
    Docs,
    Tests,
    Style,
    Performance,
    Chore,
}

impl ChangeKind {
    /// All kinds, in declaration order.
    pub const ALL: [ChangeKind; 8] = [
        ChangeKind::Feature,
        ChangeKind::Bugfix,
        ChangeKind::Refactor,
        ChangeKind::Docs,
        ChangeKind::Tests,
        ChangeKind::Style,
        ChangeKind::Performance,
        ChangeKind::Chore,
    ];

    /// Get the string representation of the change kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Feature => "feature",
            ChangeKind::Bugfix => "bugfix",
            ChangeKind::Refactor => "refactor",
            ChangeKind::Docs => "docs",
            ChangeKind::Tests => "tests",
            ChangeKind::Style => "style",
            ChangeKind::Performance => "performance",
            ChangeKind::Chore => "chore",
        }
    }

    /// The conventional-commits type token for this kind.
    pub fn token(&self) -> &'static str {
        match self {
            ChangeKind::Feature => "feat",
            ChangeKind::Bugfix => "fix",
            ChangeKind::Refactor => "refactor",
            ChangeKind::Docs => "docs",
            ChangeKind::Tests => "test",
            ChangeKind::Style => "style",
            ChangeKind::Performance => "perf",
            ChangeKind::Chore => "chore",
        }
    }

    /// Resolve a conventional-commits type token back to a kind.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "feat" => Some(ChangeKind::Feature),
            "fix" => Some(ChangeKind::Bugfix),
            "refactor" => Some(ChangeKind::Refactor),
            "docs" => Some(ChangeKind::Docs),
            "test" => Some(ChangeKind::Tests),
            "style" => Some(ChangeKind::Style),
            "perf" => Some(ChangeKind::Performance),
            "chore" => Some(ChangeKind::Chore),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" | "feat" => Ok(ChangeKind::Feature),
            "bugfix" | "fix" => Ok(ChangeKind::Bugfix),
            "refactor" => Ok(ChangeKind::Refactor),
            "docs" | "doc" => Ok(ChangeKind::Docs),
            "tests" | "test" => Ok(ChangeKind::Tests),
            "style" => Ok(ChangeKind::Style),
            "performance" | "perf" => Ok(ChangeKind::Performance),
            "chore" => Ok(ChangeKind::Chore),
            _ => Err(()),
        }
    }
}

/// A single keyword rule in the classifier table.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    /// Human-readable rule name.
    pub label: &'static str,
    /// Lowercased substrings searched for in each patch line.
    pub keywords: &'static [&'static str],
    /// Kind the rule votes for.
    pub kind: ChangeKind,
    /// Rule weight in [0, 1].
    pub weight: f64,
}

/// The default rule table. Covers the taxonomy plus language-level hints
/// for procedure, type and exception markers.
pub const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        label: "feature additions",
        keywords: &["add", "new", "implement", "introduce", "support"],
        kind: ChangeKind::Feature,
        weight: 0.8,
    },
    PatternRule {
        label: "bug fixes",
        keywords: &["fix", "bug", "issue", "crash", "resolve", "regression"],
        kind: ChangeKind::Bugfix,
        weight: 0.9,
    },
    PatternRule {
        label: "refactoring",
        keywords: &["refactor", "rename", "extract", "restructure", "simplify", "cleanup"],
        kind: ChangeKind::Refactor,
        weight: 0.7,
    },
    PatternRule {
        label: "documentation",
        keywords: &["doc", "comment", "readme", "changelog", "docstring"],
        kind: ChangeKind::Docs,
        weight: 0.8,
    },
    PatternRule {
        label: "tests",
        keywords: &["test", "assert", "expect", "mock", "fixture"],
        kind: ChangeKind::Tests,
        weight: 0.8,
    },
    PatternRule {
        label: "formatting",
        keywords: &["format", "style", "lint", "indent", "whitespace"],
        kind: ChangeKind::Style,
        weight: 0.6,
    },
    PatternRule {
        label: "performance",
        keywords: &["optimiz", "performance", "speed", "cache", "benchmark"],
        kind: ChangeKind::Performance,
        weight: 0.7,
    },
    PatternRule {
        label: "maintenance",
        keywords: &["chore", "bump", "upgrade", "dependency", "version"],
        kind: ChangeKind::Chore,
        weight: 0.6,
    },
    PatternRule {
        label: "procedure definitions",
        keywords: &["proc ", "func ", "method ", "iterator "],
        kind: ChangeKind::Feature,
        weight: 0.5,
    },
    PatternRule {
        label: "type definitions",
        keywords: &["type ", "object", "enum "],
        kind: ChangeKind::Feature,
        weight: 0.4,
    },
    PatternRule {
        label: "exception handling",
        keywords: &["try", "except", "raise", "catch", "finally"],
        kind: ChangeKind::Bugfix,
        weight: 0.5,
    },
];

/// Per-kind scores produced by [`score_kinds`], indexed in declaration
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindScores([f64; 8]);

impl KindScores {
    /// The score for one kind.
    pub fn get(&self, kind: ChangeKind) -> f64 {
        self.0[kind.index()]
    }

    /// The winning kind: highest score, ties broken in declaration order,
    /// `Chore` when every score is zero.
    pub fn winner(&self) -> ChangeKind {
        let mut best = ChangeKind::Feature;
        let mut best_score = 0.0f64;
        for kind in ChangeKind::ALL {
            let score = self.get(kind);
            if score > best_score {
                best = kind;
                best_score = score;
            }
        }
        if best_score == 0.0 {
            ChangeKind::Chore
        } else {
            best
        }
    }
}

/// Score a patch against a rule table.
///
/// For every rule, each line containing at least one of its keywords as a
/// substring of the lowercased line contributes the rule weight once.
pub fn score_kinds(patch: &str, rules: &[PatternRule]) -> KindScores {
    let mut scores = KindScores::default();
    for line in patch.lines() {
        let lower = line.to_lowercase();
        for rule in rules {
            if rule.keywords.iter().any(|kw| lower.contains(kw)) {
                scores.0[rule.kind.index()] += rule.weight;
            }
        }
    }
    scores
}

/// Classify a patch using the default rule table.
pub fn classify_patch(patch: &str) -> ChangeKind {
    score_kinds(patch, PATTERN_RULES).winner()
}

/// A detected change pattern: a labeled, classified set of files with the
/// keywords that bind them. Confidence is derived, never assigned by hand.
#[derive(Debug, Clone)]
pub struct ChangePattern {
    /// Human-readable label.
    pub label: String,
    /// Derived confidence in [0, 1].
    pub confidence: f64,
    /// Kind of the pattern.
    pub kind: ChangeKind,
    /// Member paths, in diff order, duplicate-free.
    pub files: Vec<String>,
    /// Identifiers shared by the member patches.
    pub keywords: BTreeSet<String>,
}

/// A single path test within a specialized pattern.
#[derive(Debug, Clone, Copy)]
pub enum PathTest {
    /// The path contains this directory marker. Matching prepends a `/`
    /// to the path so `tests/x.nim` satisfies `/tests/`.
    DirContains(&'static str),
    /// The file name starts with this prefix.
    NameStartsWith(&'static str),
    /// The file name contains this fragment.
    NameContains(&'static str),
    /// The path ends with this suffix.
    EndsWith(&'static str),
    /// The file extension equals this value.
    HasExtension(&'static str),
}

impl PathTest {
    /// Whether a path satisfies this test.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathTest::DirContains(marker) => format!("/{}", path).contains(marker),
            PathTest::NameStartsWith(prefix) => file_name_of(path).starts_with(prefix),
            PathTest::NameContains(fragment) => file_name_of(path).contains(fragment),
            PathTest::EndsWith(suffix) => path.ends_with(suffix),
            PathTest::HasExtension(ext) => extension_of(path) == *ext,
        }
    }
}

/// A specialized pattern recognized directly from paths, bypassing the
/// clustering pipeline. Emitted whenever any file matches.
#[derive(Debug, Clone, Copy)]
pub struct SpecializedPattern {
    /// Human-readable label.
    pub label: &'static str,
    /// Kind assigned to matching files.
    pub kind: ChangeKind,
    /// Fixed confidence.
    pub confidence: f64,
    /// A path matches when any one test passes.
    pub tests: &'static [PathTest],
}

impl SpecializedPattern {
    /// Whether a path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.tests.iter().any(|t| t.matches(path))
    }
}

/// The specialized patterns, in evaluation order.
pub const SPECIALIZED_PATTERNS: &[SpecializedPattern] = &[
    SpecializedPattern {
        label: "Documentation updates",
        kind: ChangeKind::Docs,
        confidence: 0.95,
        tests: &[
            PathTest::DirContains("/doc/"),
            PathTest::DirContains("/docs/"),
            PathTest::EndsWith(".md"),
            PathTest::EndsWith(".rst"),
            PathTest::EndsWith(".txt"),
            PathTest::NameContains("README"),
            PathTest::NameContains("CONTRIBUTING"),
        ],
    },
    SpecializedPattern {
        label: "Test changes",
        kind: ChangeKind::Tests,
        confidence: 0.95,
        tests: &[
            PathTest::DirContains("/test/"),
            PathTest::DirContains("/tests/"),
            PathTest::NameStartsWith("test_"),
            PathTest::NameContains("_test."),
            PathTest::NameContains(".test."),
        ],
    },
    SpecializedPattern {
        label: "Configuration changes",
        kind: ChangeKind::Chore,
        confidence: 0.9,
        tests: &[
            PathTest::HasExtension("conf"),
            PathTest::HasExtension("config"),
            PathTest::HasExtension("json"),
            PathTest::HasExtension("yml"),
            PathTest::HasExtension("yaml"),
            PathTest::HasExtension("toml"),
            PathTest::HasExtension("ini"),
        ],
    },
];

/// Evaluate the specialized patterns against a set of files, returning one
/// [`ChangePattern`] per matching table entry with its fixed confidence.
pub fn specialized_patterns(
    files: &[FileDiff],
    keywords_for: impl Fn(&FileDiff) -> BTreeSet<String>,
) -> Vec<ChangePattern> {
    let mut out = Vec::new();
    for entry in SPECIALIZED_PATTERNS {
        let matching: Vec<&FileDiff> = files.iter().filter(|f| entry.matches(&f.path)).collect();
        if matching.is_empty() {
            continue;
        }
        let mut keywords = BTreeSet::new();
        for file in &matching {
            keywords.extend(keywords_for(file));
        }
        out.push(ChangePattern {
            label: entry.label.to_string(),
            confidence: entry.confidence,
            kind: entry.kind,
            files: matching.iter().map(|f| f.path.clone()).collect(),
            keywords,
        });
    }
    out
}
