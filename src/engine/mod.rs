// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The division engine.
//!
//! Runs the full pipeline over a diff: dependency analysis, semantic
//! grouping, boundary optimization, pattern building, synthesis and
//! strategy transformation. Analysis is pure; only `analyze_range` and
//! `execute` touch the VCS collaborator.

use serde::Deserialize;

use crate::analysis::{analyze_dependencies, group_files};
use crate::error::Result;
use crate::proposal::strategy::{self, CommitSizePreference, DivisionStrategy};
use crate::proposal::synthesizer::{build_patterns, optimize_boundaries, synthesize};
use crate::proposal::{CommitDivisionProposal, ProposalDocument};
use crate::vcs::{ContentSource, DiffResult, DiffStats, RevisionRange, Vcs};

/// Options controlling a division request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DivisionOptions {
    /// Grouping strategy.
    pub strategy: DivisionStrategy,
    /// Commit size preference.
    pub size: CommitSizePreference,
    /// Patterns below this confidence do not seed commits.
    pub min_confidence: f64,
    /// Keep at most this many commits in the returned proposal.
    pub max_commits: Option<usize>,
}

impl Default for DivisionOptions {
    fn default() -> Self {
        Self {
            strategy: DivisionStrategy::Balanced,
            size: CommitSizePreference::Balanced,
            min_confidence: 0.0,
            max_commits: None,
        }
    }
}

/// The semantic division engine.
#[derive(Debug, Clone, Default)]
pub struct DivisionEngine {
    options: DivisionOptions,
}

impl DivisionEngine {
    /// Create an engine with the given options.
    pub fn new(options: DivisionOptions) -> Self {
        Self { options }
    }

    /// The engine's options.
    pub fn options(&self) -> &DivisionOptions {
        &self.options
    }

    /// Analyze a diff into a division proposal. Pure computation.
    pub fn analyze(&self, diff: &DiffResult) -> Result<CommitDivisionProposal> {
        let (proposal, _) = self.run_pipeline(diff)?;
        Ok(proposal)
    }

    /// Analyze a diff and render the proposal document, keeping the
    /// pre-truncation commit count in the summary.
    pub fn describe(&self, diff: &DiffResult) -> Result<ProposalDocument> {
        let (proposal, total_commits) = self.run_pipeline(diff)?;
        Ok(ProposalDocument::new(&proposal, total_commits))
    }

    /// Obtain the diff for a range from the collaborator and analyze it.
    pub fn analyze_range(&self, vcs: &dyn Vcs, range: &str) -> Result<CommitDivisionProposal> {
        RevisionRange::parse(range)?;
        let diff = vcs.diff_range(range)?;
        self.analyze(&diff)
    }

    /// Realize a proposal: create one commit per proposed commit, in
    /// order, resolving post-image content through `contents`.
    /// Returns the created commit identifiers.
    pub fn execute(
        &self,
        vcs: &mut dyn Vcs,
        proposal: &CommitDivisionProposal,
        contents: &dyn ContentSource,
    ) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for commit in &proposal.commits {
            let changes = commit.to_commit_changes(contents)?;
            tracing::debug!(header = %commit.message.lines().next().unwrap_or(""), files = changes.len(), "creating commit");
            let id = vcs.create_commit(&commit.message, &changes)?;
            created.push(id);
        }
        Ok(created)
    }

    /// The shared pipeline: returns the transformed proposal and the
    /// commit count before `max_commits` truncation.
    fn run_pipeline(&self, diff: &DiffResult) -> Result<(CommitDivisionProposal, usize)> {
        let range = RevisionRange::parse(&diff.range)?;
        let stats = DiffStats::of(diff);
        tracing::debug!(
            range = %range.raw,
            files = stats.files_changed,
            lines = stats.total_lines_changed(),
            "analyzing diff"
        );

        let graph = analyze_dependencies(diff);
        let mut groups = group_files(diff, &graph);
        if self.options.strategy == DivisionStrategy::Balanced
            && self.options.size == CommitSizePreference::Balanced
        {
            groups = optimize_boundaries(diff, groups);
        }

        let patterns = build_patterns(diff, &groups);
        let proposal = synthesize(diff, &range, &patterns, self.options.min_confidence);
        let mut proposal = strategy::transform(proposal, self.options.strategy, self.options.size);

        let total_commits = proposal.commits.len();
        if let Some(max) = self.options.max_commits {
            proposal.commits.truncate(max);
            proposal.total_files = proposal.commits.iter().map(|c| c.changes.len()).sum();
        }
        Ok((proposal, total_commits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ChangeKind;
    use crate::error::{SplitError, VcsError};
    use crate::vcs::{ChangeType, CommitChange, CommitInfo, FileDiff};
    use std::collections::BTreeMap;
    use std::path::Path;

    /// In-memory collaborator for pipeline tests.
    #[derive(Default)]
    struct FakeVcs {
        diff: Option<DiffResult>,
        commits: Vec<(String, Vec<CommitChange>)>,
        fail_on_commit: Option<usize>,
    }

    impl FakeVcs {
        fn with_diff(diff: DiffResult) -> Self {
            Self {
                diff: Some(diff),
                ..Self::default()
            }
        }
    }

    impl Vcs for FakeVcs {
        fn init(&mut self, path: &Path) -> Result<()> {
            if path.join(".jj").exists() {
                Ok(())
            } else {
                Err(SplitError::Vcs(VcsError::NotARepository {
                    path: path.to_path_buf(),
                }))
            }
        }

        fn diff_range(&self, range: &str) -> Result<DiffResult> {
            self.diff.clone().ok_or_else(|| {
                SplitError::Vcs(VcsError::DiffFailed {
                    message: format!("no diff for {range}"),
                })
            })
        }

        fn commit_history(&self, _limit: usize, _reference: &str) -> Result<Vec<CommitInfo>> {
            Ok(Vec::new())
        }

        fn commit_info(&self, id: &str) -> Result<CommitInfo> {
            Err(SplitError::Vcs(VcsError::LookupFailed {
                id: id.to_string(),
                message: "not recorded".to_string(),
            }))
        }

        fn commit_files(&self, _id: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn create_commit(&mut self, message: &str, changes: &[CommitChange]) -> Result<String> {
            if self.fail_on_commit == Some(self.commits.len()) {
                return Err(SplitError::Vcs(VcsError::CommitFailed {
                    message: "simulated failure".to_string(),
                }));
            }
            self.commits.push((message.to_string(), changes.to_vec()));
            Ok(format!("commit-{}", self.commits.len()))
        }
    }

    fn engine_with(strategy: DivisionStrategy, size: CommitSizePreference) -> DivisionEngine {
        DivisionEngine::new(DivisionOptions {
            strategy,
            size,
            ..DivisionOptions::default()
        })
    }

    fn feature_and_docs_diff() -> DiffResult {
        DiffResult::new(
            "base..tip",
            vec![
                FileDiff::new(
                    "src/foo.nim",
                    ChangeType::Modify,
                    "+proc newThing(widget: WidgetState) =\n+  widget.refresh()\n",
                ),
                FileDiff::new(
                    "src/bar.nim",
                    ChangeType::Modify,
                    "+let thing = newThing(widget)\n",
                ),
                FileDiff::new("docs/README.md", ChangeType::Modify, "+Usage overview\n"),
            ],
        )
    }

    #[test]
    fn test_scenario_feature_and_docs_split() {
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&feature_and_docs_diff()).unwrap();

        assert_eq!(proposal.commits.len(), 2);
        let feat = proposal
            .commits
            .iter()
            .find(|c| c.kind == ChangeKind::Feature)
            .expect("feature commit");
        assert!(feat.message.starts_with("feat(src): "));
        let feat_paths: Vec<&str> = feat.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(feat_paths, vec!["src/foo.nim", "src/bar.nim"]);

        let docs = proposal
            .commits
            .iter()
            .find(|c| c.kind == ChangeKind::Docs)
            .expect("docs commit");
        assert!(docs.message.starts_with("docs(docs): Documentation for docs"));
        assert_eq!(docs.changes[0].path, "docs/README.md");

        assert!(proposal.confidence >= 0.8);
        assert_eq!(proposal.original_revision, "base");
        assert_eq!(proposal.target_revision, "tip");
    }

    #[test]
    fn test_scenario_single_test_file() {
        let diff = DiffResult::new(
            "base..tip",
            vec![FileDiff::new(
                "tests/test_x.nim",
                ChangeType::Add,
                "+assert runSuite()\n",
            )],
        );
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&diff).unwrap();

        assert_eq!(proposal.commits.len(), 1);
        let commit = &proposal.commits[0];
        assert_eq!(commit.kind, ChangeKind::Tests);
        assert!(commit.message.starts_with("test"));
        assert!((commit.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_directory_centric_single_commit() {
        let files: Vec<FileDiff> = (0..8)
            .map(|i| {
                FileDiff::new(
                    format!("src/a/file{i}.rs"),
                    ChangeType::Modify,
                    format!("+fn item{i}() {{}}\n"),
                )
            })
            .collect();
        let diff = DiffResult::new("base..tip", files);
        let engine = engine_with(
            DivisionStrategy::DirectoryCentric,
            CommitSizePreference::Balanced,
        );
        let proposal = engine.analyze(&diff).unwrap();

        assert_eq!(proposal.commits.len(), 1);
        assert_eq!(proposal.commits[0].message, "chore: update files in src/a");
        assert_eq!(proposal.commits[0].changes.len(), 8);
    }

    #[test]
    fn test_scenario_file_type_centric_distinct_extensions() {
        let extensions = [
            "rs", "nim", "py", "go", "js", "ts", "c", "h", "cpp", "rb", "sh", "zig",
        ];
        let files: Vec<FileDiff> = extensions
            .iter()
            .map(|ext| {
                FileDiff::new(
                    format!("src/mod.{ext}"),
                    ChangeType::Modify,
                    "+content\n".to_string(),
                )
            })
            .collect();
        let diff = DiffResult::new("base..tip", files);
        let engine = engine_with(
            DivisionStrategy::FileTypeCentric,
            CommitSizePreference::Balanced,
        );
        let proposal = engine.analyze(&diff).unwrap();

        assert_eq!(proposal.commits.len(), 12);
        for (commit, ext) in proposal.commits.iter().zip(extensions) {
            assert_eq!(commit.message, format!("chore: update {ext} files"));
            assert_eq!(commit.changes.len(), 1);
        }
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let engine = DivisionEngine::default();
        let diff = feature_and_docs_diff();
        let first = engine.analyze(&diff).unwrap();
        let second = engine.analyze(&diff).unwrap();

        assert_eq!(first.commits.len(), second.commits.len());
        for (a, b) in first.commits.iter().zip(&second.commits) {
            assert_eq!(a.message, b.message);
            let a_paths: Vec<&str> = a.changes.iter().map(|c| c.path.as_str()).collect();
            let b_paths: Vec<&str> = b.changes.iter().map(|c| c.path.as_str()).collect();
            assert_eq!(a_paths, b_paths);
        }
    }

    #[test]
    fn test_message_conformance() {
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&feature_and_docs_diff()).unwrap();
        let header = regex::Regex::new(
            r"^(feat|fix|refactor|docs|test|style|perf|chore)(\([^)]+\))?: .+",
        )
        .unwrap();
        for commit in &proposal.commits {
            assert!(header.is_match(&commit.message), "{}", commit.message);
            if !commit.keywords.is_empty() {
                assert!(commit.message.contains("\n\nAffected components: "));
            }
        }
    }

    #[test]
    fn test_max_commits_truncation() {
        let engine = DivisionEngine::new(DivisionOptions {
            max_commits: Some(1),
            ..DivisionOptions::default()
        });
        let doc = engine.describe(&feature_and_docs_diff()).unwrap();
        assert_eq!(doc.summary.shown_commits, 1);
        assert_eq!(doc.summary.total_commits, 2);
    }

    #[test]
    fn test_confidence_bounds() {
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&feature_and_docs_diff()).unwrap();
        for commit in &proposal.commits {
            assert!(commit.confidence > 0.0 && commit.confidence <= 0.95);
        }

        let empty = engine
            .analyze(&DiffResult::empty("base..tip"))
            .unwrap();
        assert_eq!(empty.confidence, 0.0);
    }

    #[test]
    fn test_analyze_range_rejects_empty_range() {
        let vcs = FakeVcs::with_diff(feature_and_docs_diff());
        let engine = DivisionEngine::default();
        assert!(engine.analyze_range(&vcs, "").is_err());
    }

    #[test]
    fn test_analyze_range_uses_collaborator() {
        let vcs = FakeVcs::with_diff(feature_and_docs_diff());
        let engine = DivisionEngine::default();
        let proposal = engine.analyze_range(&vcs, "base..tip").unwrap();
        assert_eq!(proposal.commits.len(), 2);
    }

    #[test]
    fn test_execute_creates_commits_in_order() {
        let diff = feature_and_docs_diff();
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&diff).unwrap();

        let mut contents = BTreeMap::new();
        for file in &diff.files {
            contents.insert(file.path.clone(), format!("contents of {}", file.path));
        }

        let mut vcs = FakeVcs::default();
        let ids = engine.execute(&mut vcs, &proposal, &contents).unwrap();
        assert_eq!(ids, vec!["commit-1", "commit-2"]);
        assert_eq!(vcs.commits.len(), 2);
        assert_eq!(vcs.commits[0].0, proposal.commits[0].message);
    }

    #[test]
    fn test_execute_propagates_collaborator_failure() {
        let diff = feature_and_docs_diff();
        let engine = DivisionEngine::default();
        let proposal = engine.analyze(&diff).unwrap();

        let mut contents = BTreeMap::new();
        for file in &diff.files {
            contents.insert(file.path.clone(), String::new());
        }

        let mut vcs = FakeVcs {
            fail_on_commit: Some(1),
            ..FakeVcs::default()
        };
        let err = engine.execute(&mut vcs, &proposal, &contents).unwrap_err();
        assert!(matches!(err, SplitError::Vcs(VcsError::CommitFailed { .. })));
        // The first commit landed before the failure; nothing is rolled back.
        assert_eq!(vcs.commits.len(), 1);
    }
}
