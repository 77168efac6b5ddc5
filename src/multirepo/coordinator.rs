// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Coordinated multi-repository proposals and realization.
//!
//! Groups per-repository commits by change kind and realizes them in
//! dependency order. Realization is not transactional: a failure aborts
//! the remainder and the result carries what was created plus the error.

use std::collections::BTreeMap;

use crate::analysis::ChangeKind;
use crate::error::{Result, SplitError};
use crate::proposal::{CommitDivisionProposal, ProposedCommit};
use crate::vcs::{ContentSource, Vcs};

use super::manager::RepositoryManager;

/// One kind-aligned group of commits, at most one per repository.
#[derive(Debug, Clone)]
pub struct CoordinatedGroup {
    /// The group's change kind.
    pub kind: ChangeKind,
    /// Repository name and the commit to create there.
    pub commits: Vec<(String, ProposedCommit)>,
}

/// A commit created during coordinated realization.
#[derive(Debug, Clone)]
pub struct CreatedCommit {
    /// The repository the commit landed in.
    pub repository: String,
    /// The new commit identifier.
    pub commit_id: String,
    /// The commit message.
    pub message: String,
}

/// The outcome of a coordinated realization. Not transactional: commits
/// created before a failure stay in place.
#[derive(Debug)]
pub struct CoordinatedExecution {
    /// Commits created, in execution order.
    pub created: Vec<CreatedCommit>,
    /// The failing repository and error, when realization aborted.
    pub failure: Option<(String, SplitError)>,
}

impl CoordinatedExecution {
    /// Whether every commit was created.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Group per-repository proposals by change kind.
///
/// For each kind, round `r` collects the `r`-th commit of that kind from
/// every repository that still has one, so no group holds two commits of
/// one repository. Repository iteration follows `order`.
pub fn coordinate_proposals(
    proposals: &BTreeMap<String, CommitDivisionProposal>,
    order: &[String],
) -> Vec<CoordinatedGroup> {
    let mut groups = Vec::new();
    for kind in ChangeKind::ALL {
        let per_repo: Vec<(&str, Vec<&ProposedCommit>)> = order
            .iter()
            .filter_map(|name| proposals.get(name).map(|p| (name.as_str(), p)))
            .map(|(name, proposal)| {
                let commits: Vec<&ProposedCommit> = proposal
                    .commits
                    .iter()
                    .filter(|c| c.kind == kind)
                    .collect();
                (name, commits)
            })
            .collect();

        let rounds = per_repo.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        for round in 0..rounds {
            let commits: Vec<(String, ProposedCommit)> = per_repo
                .iter()
                .filter_map(|(name, commits)| {
                    commits.get(round).map(|c| (name.to_string(), (*c).clone()))
                })
                .collect();
            if !commits.is_empty() {
                groups.push(CoordinatedGroup { kind, commits });
            }
        }
    }
    groups
}

/// Coordinator over a repository manager.
pub struct Coordinator<'a> {
    manager: &'a RepositoryManager,
}

impl<'a> Coordinator<'a> {
    /// Create a coordinator over a manager.
    pub fn new(manager: &'a RepositoryManager) -> Self {
        Self { manager }
    }

    /// Group proposals by kind, repositories in dependency order.
    /// Refuses to proceed when the dependency graph is cyclic.
    pub fn coordinate(
        &self,
        proposals: &BTreeMap<String, CommitDivisionProposal>,
    ) -> Result<Vec<CoordinatedGroup>> {
        let order = self.manager.dependency_order()?;
        Ok(coordinate_proposals(proposals, &order))
    }

    /// Realize coordinated groups, repositories in dependency order
    /// within each group. The first failure aborts the remainder;
    /// already-created commits are reported, never rolled back.
    pub fn execute<V: Vcs>(
        &self,
        groups: &[CoordinatedGroup],
        backends: &mut BTreeMap<String, V>,
        contents: &dyn ContentSource,
    ) -> Result<CoordinatedExecution> {
        // Pre-flight: a cyclic graph refuses execution outright.
        self.manager.dependency_order()?;

        let mut created = Vec::new();
        for group in groups {
            for (repository, commit) in &group.commits {
                let outcome = realize_commit(backends, repository, commit, contents);
                match outcome {
                    Ok(commit_id) => {
                        tracing::debug!(repo = %repository, id = %commit_id, "created coordinated commit");
                        created.push(CreatedCommit {
                            repository: repository.clone(),
                            commit_id,
                            message: commit.message.clone(),
                        });
                    }
                    Err(error) => {
                        tracing::warn!(repo = %repository, error = %error, "coordinated realization aborted");
                        return Ok(CoordinatedExecution {
                            created,
                            failure: Some((repository.clone(), error)),
                        });
                    }
                }
            }
        }
        Ok(CoordinatedExecution {
            created,
            failure: None,
        })
    }
}

fn realize_commit<V: Vcs>(
    backends: &mut BTreeMap<String, V>,
    repository: &str,
    commit: &ProposedCommit,
    contents: &dyn ContentSource,
) -> Result<String> {
    let backend = backends.get_mut(repository).ok_or_else(|| {
        SplitError::invalid_input(format!("no collaborator for repository '{repository}'"))
    })?;
    let changes = commit.to_commit_changes(contents)?;
    backend.create_commit(&commit.message, &changes)
}
