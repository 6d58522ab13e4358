//! Error types for file tree operations.
//!
//! Every variant renders as a sentence the model can act on, since tool
//! executors forward these messages verbatim as tool results.

use thiserror::Error;

/// Errors produced by [`FileTree`](crate::FileTree) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Path is a directory: {path}")]
    IsADirectory { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Path already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Cannot {operation} the root directory")]
    RootOperation { operation: &'static str },

    #[error("Cannot move {from} into its own subtree ({to})")]
    MoveIntoSelf { from: String, to: String },

    #[error("Invalid view range [{start}, {end}] for a file with {line_count} lines")]
    InvalidRange {
        start: i64,
        end: i64,
        line_count: usize,
    },

    #[error("old_str must not be empty")]
    EmptyPattern,

    #[error("String not found in file: {path}")]
    StringNotFound { path: String },

    #[error("Invalid snapshot entry '{path}': {reason}")]
    SnapshotConflict { path: String, reason: String },
}

/// Result alias for file tree operations.
pub type Result<T> = std::result::Result<T, VfsError>;
