// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Proposal construction and transformation.
//!
//! The synthesizer turns analysis output into a commit division proposal;
//! the strategy transformer reshapes it; the document module renders the
//! declarative form returned to callers.

pub mod document;
pub mod message;
pub mod model;
pub mod strategy;
pub mod synthesizer;

pub use document::ProposalDocument;
pub use message::CommitMessage;
pub use model::{CommitDivisionProposal, FileChange, ProposedCommit};
pub use strategy::{transform, CommitSizePreference, DivisionStrategy};
pub use synthesizer::{build_patterns, optimize_boundaries, synthesize};
