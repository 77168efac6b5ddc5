// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Symbol extraction from patch text.
//!
//! Locates procedure and type definitions on added lines by declaration
//! markers. Only pattern-level detection; no syntactic parsing.

use serde::{Deserialize, Serialize};

use crate::vcs::diff::is_metadata_line;

/// Kind of a detected symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Procedure,
    Type,
}

/// A procedure or type definition found in a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSymbol {
    /// The symbol identifier.
    pub name: String,
    /// Procedure or type.
    pub kind: SymbolKind,
    /// Path of the file the symbol was found in.
    pub origin: String,
}

/// Tokens that introduce a procedure definition.
const PROCEDURE_MARKERS: &[&str] = &["proc", "func", "method", "iterator", "converter"];

/// Characters terminating a procedure name token.
const PROCEDURE_STRIP: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', ':', '*'];

/// Characters terminating a type name token.
const TYPE_STRIP: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', ':', '='];

/// Cut a raw token at the first strip character, so `newThing(x:` yields
/// `newThing`.
fn symbol_name<'a>(token: &'a str, strip: &[char]) -> &'a str {
    match token.find(|c| strip.contains(&c)) {
        Some(idx) => &token[..idx],
        None => token,
    }
}

/// Extract the symbols defined on the added and unchanged lines of a
/// patch, in order of appearance. Duplicates are preserved.
pub fn extract_symbols(origin: &str, patch: &str) -> Vec<CodeSymbol> {
    let mut symbols = Vec::new();
    for line in patch.lines() {
        if is_metadata_line(line) || line.starts_with('-') {
            continue;
        }
        let content = line.strip_prefix('+').unwrap_or(line);
        let tokens: Vec<&str> = content.split_whitespace().collect();
        for (i, token) in tokens.iter().enumerate() {
            let Some(next) = tokens.get(i + 1) else {
                continue;
            };
            if PROCEDURE_MARKERS.contains(token) {
                let name = symbol_name(next, PROCEDURE_STRIP);
                if !name.is_empty() {
                    symbols.push(CodeSymbol {
                        name: name.to_string(),
                        kind: SymbolKind::Procedure,
                        origin: origin.to_string(),
                    });
                }
            } else if *token == "type" {
                let name = symbol_name(next, TYPE_STRIP);
                if !name.is_empty() {
                    symbols.push(CodeSymbol {
                        name: name.to_string(),
                        kind: SymbolKind::Type,
                        origin: origin.to_string(),
                    });
                }
            }
        }
    }
    symbols
}
