// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Conventional commit message structure and synthesis.
//!
//! Messages are `<type>[(<scope>)]: <description>` with an optional
//! `Affected components:` body. Descriptions come from a per-kind
//! template table.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::analysis::ChangeKind;
use crate::error::{Result, SplitError};

lazy_static! {
    /// Regex for parsing conventional commit messages.
    static ref CONVENTIONAL_REGEX: Regex = Regex::new(
        r"(?s)^(?P<type>[a-z]+)(?:\((?P<scope>[^)]+)\))?: (?P<subject>[^\n]+)(?:\n\n(?P<body>.*))?$"
    )
    .unwrap();
}

/// Maximum number of keywords listed in a message body.
const MAX_BODY_KEYWORDS: usize = 5;

/// Per-kind description templates; `{target}` is replaced by the group's
/// majority directory.
pub const DESCRIPTION_TEMPLATES: &[(ChangeKind, &str)] = &[
    (ChangeKind::Feature, "New feature in {target}"),
    (ChangeKind::Bugfix, "Fix issue in {target}"),
    (ChangeKind::Refactor, "Refactor {target}"),
    (ChangeKind::Docs, "Documentation for {target}"),
    (ChangeKind::Tests, "Tests for {target}"),
    (ChangeKind::Style, "Style cleanup in {target}"),
    (ChangeKind::Performance, "Performance improvements in {target}"),
    (ChangeKind::Chore, "Changes to {target}"),
];

/// A structured commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// The change kind, rendered as its conventional token.
    pub kind: ChangeKind,
    /// Optional scope.
    pub scope: Option<String>,
    /// Description line.
    pub description: String,
    /// Optional body.
    pub body: Option<String>,
}

impl CommitMessage {
    /// Create a new commit message.
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            scope: None,
            description: description.into(),
            body: None,
        }
    }

    /// Set the scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.is_empty() {
            self.body = Some(body);
        }
        self
    }

    /// Parse a commit message produced by [`CommitMessage::format`].
    pub fn parse(message: &str) -> Result<Self> {
        let captures = CONVENTIONAL_REGEX.captures(message).ok_or_else(|| {
            SplitError::invalid_input(format!("not a conventional commit message: '{message}'"))
        })?;

        let token = captures.name("type").map(|m| m.as_str()).unwrap_or("");
        let kind = ChangeKind::from_token(token).ok_or_else(|| {
            SplitError::invalid_input(format!("unknown commit type token: '{token}'"))
        })?;

        Ok(Self {
            kind,
            scope: captures.name("scope").map(|m| m.as_str().to_string()),
            description: captures
                .name("subject")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            body: captures
                .name("body")
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    /// Format the commit message as a string.
    pub fn format(&self) -> String {
        let mut result = String::new();
        result.push_str(self.kind.token());

        if let Some(ref scope) = self.scope {
            result.push('(');
            result.push_str(scope);
            result.push(')');
        }

        result.push_str(": ");
        result.push_str(&self.description);

        if let Some(ref body) = self.body {
            result.push_str("\n\n");
            result.push_str(body);
        }

        result
    }

    /// Get the first line of the message.
    pub fn header(&self) -> String {
        match self.scope {
            Some(ref scope) => format!("{}({}): {}", self.kind.token(), scope, self.description),
            None => format!("{}: {}", self.kind.token(), self.description),
        }
    }
}

/// Render the description template for a kind.
pub fn describe(kind: ChangeKind, target: &str) -> String {
    let template = DESCRIPTION_TEMPLATES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, t)| *t)
        .unwrap_or("Changes to {target}");
    clean_description(&template.replace("{target}", target))
}

/// Textual cleanup applied to synthesized descriptions.
pub fn clean_description(description: &str) -> String {
    description.replace("Changes to", "update")
}

/// Render the `Affected components:` body from a keyword set. Lists up to
/// five keywords, lexicographically. Empty when there are no keywords.
pub fn keyword_body(keywords: &BTreeSet<String>) -> Option<String> {
    if keywords.is_empty() {
        return None;
    }
    let listed: Vec<&str> = keywords
        .iter()
        .take(MAX_BODY_KEYWORDS)
        .map(String::as_str)
        .collect();
    Some(format!("Affected components: {}", listed.join(", ")))
}

/// Fixed message used when small commits of one kind are merged.
pub fn merge_message(kind: ChangeKind) -> String {
    format!(
        "{}: combine multiple {} changes",
        kind.token(),
        kind.as_str()
    )
}
