// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for the jjsplit engine.
//!
//! This module defines all error types used throughout the engine,
//! with proper error categorization and context propagation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for jjsplit operations.
#[derive(Error, Debug)]
pub enum SplitError {
    // VCS collaborator errors
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    // Persistence errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Caller-supplied arguments that cannot be interpreted
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // Repository dependency graph contains a cycle
    #[error("Cyclic dependency among repositories: {names:?}")]
    CyclicDependency { names: Vec<String> },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl SplitError {
    /// Construct an `InvalidInput` error from any displayable message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SplitError::InvalidInput {
            message: message.into(),
        }
    }
}

/// VCS-collaborator-related errors.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Not a repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Invalid revision range: '{range}'")]
    InvalidRange { range: String },

    #[error("Failed to get diff: {message}")]
    DiffFailed { message: String },

    #[error("Failed to create commit: {message}")]
    CommitFailed { message: String },

    #[error("Failed to read commit '{id}': {message}")]
    LookupFailed { id: String, message: String },

    #[error("VCS command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },
}

/// Persistence-related errors for the repository manager.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load repository configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to parse repository configuration: {message}")]
    ParseError { message: String },

    #[error("Failed to save repository configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Result type alias for jjsplit operations.
pub type Result<T> = std::result::Result<T, SplitError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SplitError::WithContext {
            context: context.into(),
            message: e.to_string(),
        })
    }
}
