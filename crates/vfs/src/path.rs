//! Path normalization for the virtual tree.
//!
//! Every path handed to the tree is reduced to a single canonical spelling
//! before lookup: absolute, `/`-separated, no empty or `.` segments, no
//! trailing slash (except the root itself). Parent traversal (`..`) is
//! rejected outright rather than resolved, so a tool can never address
//! anything by climbing.

use crate::error::{Result, VfsError};

/// The root path.
pub const ROOT: &str = "/";

/// Normalize a caller-supplied path.
///
/// - `src/App.jsx`     → `/src/App.jsx`
/// - `//src/./a/`      → `/src/a`
/// - `\components\B.jsx` → `/components/B.jsx`
/// - `/a/../b`         → error
pub fn normalize_path(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(invalid(raw, "path must not be empty"));
    }
    if raw.contains('\0') {
        return Err(invalid(raw, "path contains a NUL byte"));
    }

    let unified = raw.replace('\\', "/");
    let mut normalized = String::with_capacity(unified.len() + 1);

    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid(raw, "parent traversal ('..') is not allowed")),
            name => {
                normalized.push('/');
                normalized.push_str(name);
            }
        }
    }

    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Split a normalized, non-root path into `(parent, name)`.
///
/// `/a/b/c.txt` → `("/a/b", "c.txt")`, `/App.jsx` → `("/", "App.jsx")`.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => (ROOT, &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (ROOT, path),
    }
}

/// Iterate the segments of a normalized path. The root yields nothing.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether `path` is `ancestor` itself or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

fn invalid(path: &str, reason: &str) -> VfsError {
    VfsError::InvalidPath {
        path: path.into(),
        reason: reason.into(),
    }
}
