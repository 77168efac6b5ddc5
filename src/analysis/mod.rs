// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Semantic division analysis.
//!
//! Pure computations over the diff model: keyword and symbol extraction,
//! pattern classification, dependency inference, grouping and cohesion
//! scoring. Nothing in this module touches the VCS.

pub mod cohesion;
pub mod dependencies;
pub mod grouping;
pub mod keywords;
pub mod patterns;
pub mod symbols;

pub use cohesion::cohesion_score;
pub use dependencies::{analyze_dependencies, file_keywords, DependencyGraph};
pub use grouping::group_files;
pub use keywords::extract_keywords;
pub use patterns::{
    classify_patch, score_kinds, ChangeKind, ChangePattern, KindScores, PatternRule,
    SpecializedPattern, PATTERN_RULES, SPECIALIZED_PATTERNS,
};
pub use symbols::{extract_symbols, CodeSymbol, SymbolKind};
