//! The flat serialized form of a [`FileTree`](crate::FileTree).
//!
//! A snapshot maps each normalized path to `{ type, name, path, content? }`.
//! It is what the client posts with each request, what the stream's final
//! frame carries, and what the project store persists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a serialized node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Directory,
}

/// One entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Final path segment. Informational; the map key is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Full path. Informational; the map key is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// File content. Absent for directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SerializedNode {
    /// A file entry.
    pub fn file(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            node_type: NodeType::File,
            name: Some(last_segment(&path)),
            path: Some(path),
            content: Some(content.into()),
        }
    }

    /// A directory entry.
    pub fn directory(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            node_type: NodeType::Directory,
            name: Some(last_segment(&path)),
            path: Some(path),
            content: None,
        }
    }
}

fn last_segment(path: &str) -> String {
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Flat path → node mapping, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    nodes: BTreeMap<String, SerializedNode>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot out of an arbitrary JSON value (e.g. a request body field).
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, node: SerializedNode) {
        self.nodes.insert(path.into(), node);
    }

    pub fn get(&self, path: &str) -> Option<&SerializedNode> {
        self.nodes.get(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SerializedNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate `(path, content)` for file entries only.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().filter_map(|(k, v)| match v.node_type {
            NodeType::File => Some((k.as_str(), v.content.as_deref().unwrap_or(""))),
            NodeType::Directory => None,
        })
    }

    /// Number of file entries.
    pub fn file_count(&self) -> usize {
        self.files().count()
    }
}
