//! Arena-backed file tree.
//!
//! Nodes live in a slot vector and refer to each other by [`NodeId`]. The
//! root directory is always slot 0. Directories own their children through a
//! `BTreeMap<String, NodeId>`, so listings and serialization come out sorted
//! without extra work. Removed subtrees return their slots to a free list.

use crate::error::{Result, VfsError};
use crate::path::{self, ROOT, normalize_path};
use crate::snapshot::{NodeType, SerializedNode, Snapshot};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root directory.
    pub const ROOT: NodeId = NodeId(0);
}

/// Inclusive, 1-based line range for [`FileTree::view_file`].
///
/// `end = -1` means "through the last line".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub start: i64,
    pub end: i64,
}

impl ViewRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

impl From<[i64; 2]> for ViewRange {
    fn from([start, end]: [i64; 2]) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    File { content: String },
    Directory { children: BTreeMap<String, NodeId> },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    fn directory(name: &str, parent: NodeId) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent),
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    fn file(name: &str, parent: NodeId, content: String) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent),
            kind: NodeKind::File { content },
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }
}

/// In-memory project tree rooted at `/`.
#[derive(Debug, Clone)]
pub struct FileTree {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// An empty tree containing only the root directory.
    pub fn new() -> Self {
        let root = Node {
            name: String::new(),
            parent: None,
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        };
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
        }
    }

    /// Rebuild a tree from its serialized form.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let mut tree = Self::new();
        tree.deserialize_from_nodes(snapshot)?;
        Ok(tree)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Number of nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.resolve(path)
            .is_some_and(|id| !self.node(id).is_dir())
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|id| self.node(id).is_dir())
    }

    /// Every path in the tree, sorted, excluding the root.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len());
        self.walk(NodeId::ROOT, ROOT, &mut |path, _| out.push(path.to_string()));
        out.sort();
        out
    }

    /// Raw content of a file.
    pub fn read_file(&self, path: &str) -> Result<&str> {
        let norm = normalize_path(path)?;
        let id = self.lookup(&norm).ok_or_else(|| VfsError::NotFound {
            path: norm.clone(),
        })?;
        match &self.node(id).kind {
            NodeKind::File { content } => Ok(content),
            NodeKind::Directory { .. } => Err(VfsError::IsADirectory { path: norm }),
        }
    }

    /// Line-numbered view of a file, or a listing of a directory.
    pub fn view_file(&self, path: &str, range: Option<ViewRange>) -> Result<String> {
        let norm = normalize_path(path)?;
        let id = self.lookup(&norm).ok_or_else(|| VfsError::NotFound {
            path: norm.clone(),
        })?;

        let content = match &self.node(id).kind {
            NodeKind::Directory { children } => {
                if children.is_empty() {
                    return Ok("(empty directory)".to_string());
                }
                let listing: Vec<String> = children
                    .iter()
                    .map(|(name, child)| {
                        if self.node(*child).is_dir() {
                            format!("[DIR] {name}")
                        } else {
                            format!("[FILE] {name}")
                        }
                    })
                    .collect();
                return Ok(listing.join("\n"));
            }
            NodeKind::File { content } => content,
        };

        if content.is_empty() {
            return Ok("(empty file)".to_string());
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let line_count = lines.len();
        let (first, last) = match range {
            None => (1, line_count),
            Some(ViewRange { start, end }) => {
                let bad = || VfsError::InvalidRange {
                    start,
                    end,
                    line_count,
                };
                if start < 1 || start as usize > line_count {
                    return Err(bad());
                }
                let last = if end == -1 {
                    line_count
                } else if end < start {
                    return Err(bad());
                } else {
                    (end as usize).min(line_count)
                };
                (start as usize, last)
            }
        };

        let numbered: Vec<String> = lines[first - 1..last]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}\t{}", first + i, line))
            .collect();
        Ok(numbered.join("\n"))
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Create or overwrite a file, creating any missing ancestor directories.
    pub fn create_file_with_parents(&mut self, path: &str, content: &str) -> Result<String> {
        let norm = normalize_path(path)?;
        if norm == ROOT {
            return Err(VfsError::RootOperation {
                operation: "overwrite",
            });
        }
        if let Some(id) = self.lookup(&norm) {
            if self.node(id).is_dir() {
                return Err(VfsError::IsADirectory { path: norm });
            }
        }

        let (parent_path, name) = path::split_parent(&norm);
        let parent = self.ensure_dir(parent_path)?;

        match self.child(parent, name) {
            Some(existing) => {
                if let NodeKind::File { content: current } = &mut self.node_mut(existing).kind {
                    *current = content.to_string();
                }
                debug!(path = %norm, bytes = content.len(), "Overwrote file");
            }
            None => {
                let id = self.alloc(Node::file(name, parent, content.to_string()));
                self.attach(parent, name, id);
                debug!(path = %norm, bytes = content.len(), "Created file");
            }
        }

        Ok(format!("File created successfully: {norm}"))
    }

    /// Replace the first occurrence of `old` with `new`.
    pub fn replace_in_file(&mut self, path: &str, old: &str, new: &str) -> Result<String> {
        let norm = normalize_path(path)?;
        if old.is_empty() {
            return Err(VfsError::EmptyPattern);
        }
        let content = self.file_content_mut(&norm)?;
        let Some(at) = content.find(old) else {
            return Err(VfsError::StringNotFound { path: norm });
        };
        content.replace_range(at..at + old.len(), new);

        let remaining = content[at + new.len()..].matches(old).count();
        debug!(path = %norm, remaining, "Replaced text");
        if remaining == 0 {
            Ok(format!("Replaced text successfully in {norm}"))
        } else {
            Ok(format!(
                "Replaced text successfully in {norm} ({remaining} further occurrence(s) left unchanged)"
            ))
        }
    }

    /// Insert `text` as a new line after 0-based `line`.
    ///
    /// `line = 0` inserts before the first line; values past the end append.
    pub fn insert_in_file(&mut self, path: &str, line: usize, text: &str) -> Result<String> {
        let norm = normalize_path(path)?;
        let content = self.file_content_mut(&norm)?;

        let mut lines: Vec<&str> = if content.is_empty() {
            Vec::new()
        } else {
            content.split('\n').collect()
        };
        let at = line.min(lines.len());
        lines.insert(at, text);
        let joined = lines.join("\n");
        *content = joined;

        debug!(path = %norm, line = at, "Inserted text");
        Ok(format!("Text inserted successfully at line {at} in {norm}"))
    }

    /// Move a file or directory subtree. Returns `false` and leaves the tree
    /// untouched if the move is not possible.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.try_rename(from, to) {
            Ok(_) => true,
            Err(e) => {
                debug!(from, to, error = %e, "Rename rejected");
                false
            }
        }
    }

    /// Like [`rename`](Self::rename), reporting why a move was rejected.
    pub fn try_rename(&mut self, from: &str, to: &str) -> Result<String> {
        let src = normalize_path(from)?;
        let dst = normalize_path(to)?;
        if src == ROOT {
            return Err(VfsError::RootOperation { operation: "move" });
        }
        if dst == ROOT {
            return Err(VfsError::RootOperation {
                operation: "replace",
            });
        }
        let id = self.lookup(&src).ok_or_else(|| VfsError::NotFound {
            path: src.clone(),
        })?;
        if self.lookup(&dst).is_some() {
            return Err(VfsError::AlreadyExists { path: dst });
        }
        if path::is_within(&dst, &src) {
            return Err(VfsError::MoveIntoSelf { from: src, to: dst });
        }

        let (parent_path, name) = path::split_parent(&dst);
        let new_parent = self.ensure_dir(parent_path)?;

        self.detach(id);
        {
            let node = self.node_mut(id);
            node.name = name.to_string();
            node.parent = Some(new_parent);
        }
        self.attach(new_parent, name, id);

        debug!(from = %src, to = %dst, "Renamed");
        Ok(format!("Renamed {src} to {dst}"))
    }

    /// Remove a node and its subtree. Returns `false` for the root or a
    /// missing path.
    pub fn delete_file(&mut self, path: &str) -> bool {
        match self.try_delete(path) {
            Ok(_) => true,
            Err(e) => {
                debug!(path, error = %e, "Delete rejected");
                false
            }
        }
    }

    /// Like [`delete_file`](Self::delete_file), reporting why it failed.
    pub fn try_delete(&mut self, path: &str) -> Result<String> {
        let norm = normalize_path(path)?;
        if norm == ROOT {
            return Err(VfsError::RootOperation {
                operation: "delete",
            });
        }
        let id = self.lookup(&norm).ok_or_else(|| VfsError::NotFound {
            path: norm.clone(),
        })?;
        self.detach(id);
        let freed = self.free_subtree(id);
        debug!(path = %norm, freed, "Deleted");
        Ok(format!("Deleted {norm}"))
    }

    // ── Serialization ────────────────────────────────────────────────────

    /// Flatten the tree into a path-keyed snapshot.
    pub fn serialize(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        self.walk(NodeId::ROOT, ROOT, &mut |path, node| {
            let entry = match &node.kind {
                NodeKind::File { content } => SerializedNode::file(path, content.as_str()),
                NodeKind::Directory { .. } => SerializedNode::directory(path),
            };
            snapshot.insert(path, entry);
        });
        snapshot
    }

    /// Replace the tree's contents with `snapshot`.
    ///
    /// The replacement is built separately and only swapped in once every
    /// entry has been accepted.
    pub fn deserialize_from_nodes(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut entries: BTreeMap<String, &SerializedNode> = BTreeMap::new();
        for (raw, node) in snapshot.iter() {
            let norm = normalize_path(raw)?;
            if entries.insert(norm.clone(), node).is_some() {
                return Err(conflict(&norm, "duplicate path after normalization"));
            }
        }

        let mut fresh = Self::new();
        for (path, node) in &entries {
            match node.node_type {
                NodeType::Directory => {
                    fresh
                        .ensure_dir(path)
                        .map_err(|e| conflict(path, &e.to_string()))?;
                }
                NodeType::File => {
                    if path == ROOT {
                        return Err(conflict(path, "the root must be a directory"));
                    }
                    let content = node.content.as_deref().unwrap_or("");
                    fresh
                        .create_file_with_parents(path, content)
                        .map_err(|e| conflict(path, &e.to_string()))?;
                }
            }
        }

        trace!(nodes = fresh.len(), "Deserialized snapshot");
        *self = fresh;
        Ok(())
    }

    // ── Arena internals ──────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> &Node {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("dangling node id {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("dangling node id {id:?}"),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release `id` and everything beneath it. Returns the number of slots freed.
    fn free_subtree(&mut self, id: NodeId) -> usize {
        debug_assert_ne!(id, NodeId::ROOT, "root is never freed");
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.slots[next.0].take() {
                if let NodeKind::Directory { children } = node.kind {
                    stack.extend(children.into_values());
                }
                self.free.push(next.0);
                freed += 1;
            }
        }
        freed
    }

    fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        match &self.node(dir).kind {
            NodeKind::Directory { children } => children.get(name).copied(),
            NodeKind::File { .. } => None,
        }
    }

    fn attach(&mut self, parent: NodeId, name: &str, id: NodeId) {
        if let NodeKind::Directory { children } = &mut self.node_mut(parent).kind {
            children.insert(name.to_string(), id);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, name) = {
            let node = self.node(id);
            (node.parent, node.name.clone())
        };
        if let Some(parent) = parent {
            if let NodeKind::Directory { children } = &mut self.node_mut(parent).kind {
                children.remove(&name);
            }
        }
    }

    fn resolve(&self, path: &str) -> Option<NodeId> {
        normalize_path(path).ok().and_then(|p| self.lookup(&p))
    }

    /// Walk a normalized path from the root.
    fn lookup(&self, norm: &str) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for segment in path::segments(norm) {
            current = self.child(current, segment)?;
        }
        Some(current)
    }

    /// Fail if any existing component of `norm` is a file.
    fn check_dir_chain(&self, norm: &str) -> Result<()> {
        let mut current = NodeId::ROOT;
        for segment in path::segments(norm) {
            match self.child(current, segment) {
                Some(next) if self.node(next).is_dir() => current = next,
                Some(next) => {
                    return Err(VfsError::NotADirectory {
                        path: self.path_of(next),
                    });
                }
                None => return Ok(()),
            }
        }
        Ok(())
    }

    /// Resolve `norm` as a directory, creating missing components.
    fn ensure_dir(&mut self, norm: &str) -> Result<NodeId> {
        self.check_dir_chain(norm)?;
        let mut current = NodeId::ROOT;
        for segment in path::segments(norm) {
            current = match self.child(current, segment) {
                Some(next) => next,
                None => {
                    let id = self.alloc(Node::directory(segment, current));
                    self.attach(current, segment, id);
                    trace!(dir = segment, "Created intermediate directory");
                    id
                }
            };
        }
        Ok(current)
    }

    fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            parts.push(self.node(current).name.as_str());
            current = parent;
            debug_assert!(parts.len() <= self.slots.len(), "cycle in file tree");
        }
        if parts.is_empty() {
            return ROOT.to_string();
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    fn walk(&self, dir: NodeId, dir_path: &str, visit: &mut dyn FnMut(&str, &Node)) {
        let NodeKind::Directory { children } = &self.node(dir).kind else {
            return;
        };
        for (name, &child) in children {
            let child_path = if dir_path == ROOT {
                format!("/{name}")
            } else {
                format!("{dir_path}/{name}")
            };
            let node = self.node(child);
            debug_assert_eq!(node.parent, Some(dir), "parent link out of sync");
            visit(&child_path, node);
            if node.is_dir() {
                self.walk(child, &child_path, visit);
            }
        }
    }

    fn file_content_mut(&mut self, norm: &str) -> Result<&mut String> {
        let id = self.lookup(norm).ok_or_else(|| VfsError::NotFound {
            path: norm.to_string(),
        })?;
        match &mut self.node_mut(id).kind {
            NodeKind::File { content } => Ok(content),
            NodeKind::Directory { .. } => Err(VfsError::IsADirectory {
                path: norm.to_string(),
            }),
        }
    }
}

fn conflict(path: &str, reason: &str) -> VfsError {
    VfsError::SnapshotConflict {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
