//! # UIGen VFS
//!
//! The in-memory project tree the agent edits. Nothing in this crate touches
//! the real filesystem: a [`FileTree`] is an arena of file and directory
//! nodes addressed by normalized absolute paths, and a [`Snapshot`] is its
//! flat, lossless serialized form that travels to and from the client.
//!
//! All editing primitives return a [`VfsError`] instead of panicking on bad
//! input, so tool executors can hand the message straight back to the model.

pub mod error;
pub mod path;
pub mod snapshot;
pub mod tree;

use std::sync::{Arc, Mutex};

pub use error::{Result, VfsError};
pub use path::normalize_path;
pub use snapshot::{NodeType, SerializedNode, Snapshot};
pub use tree::{FileTree, NodeId, ViewRange};

/// A file tree shared between a session and the tool executors bound to it.
///
/// The lock is only ever held for the duration of a single synchronous tree
/// operation; never across an `.await`.
pub type SharedFileTree = Arc<Mutex<FileTree>>;

/// Wrap a tree for binding to tool executors.
pub fn shared(tree: FileTree) -> SharedFileTree {
    Arc::new(Mutex::new(tree))
}
