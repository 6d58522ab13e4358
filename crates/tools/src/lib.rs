//! Tools the UIGen agent uses to edit a project.
//!
//! Both tools operate on one [`SharedFileTree`] and never touch the real
//! filesystem:
//!
//! - `str_replace_editor`: view, create, replace and insert text
//! - `file_manager`: rename (move) and delete files or folders
//!
//! Tool-level failures come back as text for the model to read; only input
//! that cannot be parsed at all is reported as a [`ToolError`](uigen_core::ToolError).

pub mod file_manager;
pub mod str_replace_editor;

use uigen_core::tool::ToolRegistry;
use uigen_vfs::SharedFileTree;

pub use file_manager::FileManagerTool;
pub use str_replace_editor::StrReplaceEditorTool;

/// Create a registry with both editing tools bound to `tree`.
pub fn registry(tree: SharedFileTree) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(StrReplaceEditorTool::new(tree.clone())));
    registry.register(Box::new(FileManagerTool::new(tree)));
    registry
}
