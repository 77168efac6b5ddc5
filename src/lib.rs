// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! jjsplit - Semantic Commit Splitting for Jujutsu
//!
//! Analyzes a revision range, decomposes the aggregate change set into
//! semantically coherent groups, and synthesizes a sequence of smaller
//! conventional commits that together reproduce the original change set.
//!
//! # Features
//!
//! - **Semantic division**: keyword and symbol extraction, pattern
//!   classification, dependency-driven grouping, cohesion-based boundary
//!   optimization
//! - **Strategies**: balanced, semantic-centric, file-type-centric and
//!   directory-centric regrouping with many/few/balanced size preferences
//! - **Conventional commits**: messages synthesized from a per-kind
//!   template table
//! - **Multi-repository coordination**: dependency-ordered coordinated
//!   splits across repositories
//!
//! # Example
//!
//! ```no_run
//! use jjsplit::engine::{DivisionEngine, DivisionOptions};
//! use jjsplit::vcs::DiffResult;
//!
//! let engine = DivisionEngine::new(DivisionOptions::default());
//! let diff = DiffResult::empty("main..@");
//! let proposal = engine.analyze(&diff).unwrap();
//! for commit in &proposal.commits {
//!     println!("{}", commit.message);
//! }
//! ```

// Module declarations
pub mod analysis;
pub mod engine;
pub mod error;
pub mod multirepo;
pub mod proposal;
pub mod vcs;

// Re-exports for convenience
pub use analysis::ChangeKind;
pub use engine::{DivisionEngine, DivisionOptions};
pub use error::{Result, SplitError};
pub use proposal::{
    CommitDivisionProposal, CommitSizePreference, DivisionStrategy, ProposalDocument,
    ProposedCommit,
};
pub use vcs::{DiffResult, FileDiff, Vcs};
