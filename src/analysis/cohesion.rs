// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Group cohesion scoring.
//!
//! Quantifies how uniform a file group is across directory, extension and
//! change-kind axes, plus keyword density. Used when relocating boundary
//! files between groups.

use std::collections::{BTreeSet, HashMap};

use crate::vcs::diff::FileDiff;

/// Weight of directory uniformity.
const DIR_WEIGHT: f64 = 0.3;
/// Weight of extension uniformity.
const EXT_WEIGHT: f64 = 0.2;
/// Weight of change-kind uniformity.
const KIND_WEIGHT: f64 = 0.2;
/// Weight of keyword density.
const KEYWORD_WEIGHT: f64 = 0.3;

/// Keyword count at which density saturates.
const KEYWORD_SATURATION: f64 = 10.0;

fn max_bucket_count<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut max = 0;
    for value in values {
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        max = max.max(*count);
    }
    max
}

/// Score a group of files in [0, 1].
pub fn cohesion_score(files: &[&FileDiff], keywords: &BTreeSet<String>) -> f64 {
    if files.is_empty() {
        return 0.0;
    }
    let count = files.len() as f64;

    let dir_cohesion = max_bucket_count(files.iter().map(|f| f.directory())) as f64 / count;
    let ext_cohesion = max_bucket_count(files.iter().map(|f| f.extension())) as f64 / count;
    let kind_cohesion =
        max_bucket_count(files.iter().map(|f| f.change_type.as_str())) as f64 / count;
    let keyword_density = (keywords.len() as f64 / KEYWORD_SATURATION).min(1.0);

    DIR_WEIGHT * dir_cohesion
        + EXT_WEIGHT * ext_cohesion
        + KIND_WEIGHT * kind_cohesion
        + KEYWORD_WEIGHT * keyword_density
}
