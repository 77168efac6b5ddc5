// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Multi-repository coordination.
//!
//! The manager holds the named repository set and its dependency graph;
//! the analyzer infers cross-repository dependencies from diffs; the
//! coordinator produces kind-grouped proposals and realizes them in
//! dependency order.

pub mod analyzer;
pub mod coordinator;
pub mod manager;

pub use analyzer::{analyze_cross_repo, CrossDependencyKind, CrossRepoDependency};
pub use coordinator::{
    coordinate_proposals, CoordinatedExecution, CoordinatedGroup, Coordinator, CreatedCommit,
};
pub use manager::{Repository, RepositoryManager};
