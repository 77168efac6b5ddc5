// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Keyword extraction from patch text.
//!
//! Yields the set of lowercased identifiers mentioned on added and removed
//! lines. The stopword table filters control-flow and declaration keywords
//! so the surviving identifiers are the ones worth comparing across files.

use std::collections::BTreeSet;

use crate::vcs::diff::is_metadata_line;

/// Control-flow and declaration keywords excluded from keyword sets.
pub const STOPWORDS: &[&str] = &[
    "if", "else", "elif", "while", "for", "case", "of", "return", "break", "continue", "yield",
    "and", "or", "not", "xor", "shl", "shr", "func", "proc", "type", "var", "let", "const",
    "import", "from", "include", "export",
];

/// Characters treated as token separators, in addition to whitespace.
pub const SEPARATORS: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', ':', '.'];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Extract the keyword set of a patch.
///
/// Metadata lines (`@@`, `+++`, `---`) are skipped; a leading `+` or `-`
/// is stripped; tokens shorter than three characters, tokens not starting
/// with an alphabetic character, and stopwords are rejected.
pub fn extract_keywords(patch: &str) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    for line in patch.lines() {
        if is_metadata_line(line) {
            continue;
        }
        let content = line
            .strip_prefix('+')
            .or_else(|| line.strip_prefix('-'))
            .unwrap_or(line);
        for token in content.split(is_separator) {
            let token = token.trim();
            if token.len() <= 2 {
                continue;
            }
            if !token.chars().next().is_some_and(|c| c.is_alphabetic()) {
                continue;
            }
            let lower = token.to_lowercase();
            if STOPWORDS.contains(&lower.as_str()) {
                continue;
            }
            keywords.insert(lower);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_basic() {
        let patch = "+proc newThing(value: int) =\n+  result = value\n";
        let keywords = extract_keywords(patch);
        assert!(keywords.contains("newthing"));
        assert!(keywords.contains("value"));
        assert!(keywords.contains("result"));
        // Declaration keyword filtered out.
        assert!(!keywords.contains("proc"));
        // Three characters long, so it survives the length gate.
        assert!(keywords.contains("int"));
    }

    #[test]
    fn test_extract_keywords_length_gate() {
        let keywords = extract_keywords("+ab abc\n");
        assert!(!keywords.contains("ab"));
        assert!(keywords.contains("abc"));
    }

    #[test]
    fn test_extract_keywords_skips_metadata() {
        let patch = "--- a/src/parser.nim\n+++ b/src/parser.nim\n@@ -1,1 +1,1 @@\n+tokenize(input)\n";
        let keywords = extract_keywords(patch);
        assert!(keywords.contains("tokenize"));
        assert!(keywords.contains("input"));
        assert!(!keywords.contains("parser"));
    }

    #[test]
    fn test_extract_keywords_includes_removed_lines() {
        let keywords = extract_keywords("-oldHelper()\n+newHelper()\n");
        assert!(keywords.contains("oldhelper"));
        assert!(keywords.contains("newhelper"));
    }

    #[test]
    fn test_extract_keywords_rejects_non_alphabetic_start() {
        let keywords = extract_keywords("+let x = 123abc + _private\n");
        assert!(!keywords.contains("123abc"));
        assert!(!keywords.contains("_private"));
    }

    #[test]
    fn test_extract_keywords_rejects_stopwords() {
        let keywords = extract_keywords("+while running: continue\n");
        assert!(!keywords.contains("while"));
        assert!(!keywords.contains("continue"));
        assert!(keywords.contains("running"));
    }

    #[test]
    fn test_extract_keywords_splits_on_separators() {
        let keywords = extract_keywords("+table[key].update(entry, flags)\n");
        assert!(keywords.contains("table"));
        assert!(keywords.contains("key"));
        assert!(keywords.contains("update"));
        assert!(keywords.contains("entry"));
        assert!(keywords.contains("flags"));
    }
}
