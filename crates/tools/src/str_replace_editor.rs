//! `str_replace_editor`: view and edit files in the virtual tree.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uigen_core::error::ToolError;
use uigen_core::tool::{Tool, ToolResult};
use uigen_vfs::{SharedFileTree, ViewRange};

const UNDO_UNSUPPORTED: &str =
    "Error: undo_edit command is not supported in this version. Use str_replace to revert changes.";

/// Parsed tool input, one variant per command.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum EditorCommand {
    View {
        path: String,
        #[serde(default)]
        view_range: Option<[i64; 2]>,
    },
    Create {
        path: String,
        #[serde(default)]
        file_text: Option<String>,
    },
    StrReplace {
        path: String,
        #[serde(default)]
        old_str: Option<String>,
        #[serde(default)]
        new_str: Option<String>,
    },
    Insert {
        path: String,
        #[serde(default)]
        insert_line: Option<i64>,
        #[serde(default)]
        new_str: Option<String>,
    },
    UndoEdit,
}

impl EditorCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::View { .. } => "view",
            Self::Create { .. } => "create",
            Self::StrReplace { .. } => "str_replace",
            Self::Insert { .. } => "insert",
            Self::UndoEdit => "undo_edit",
        }
    }
}

pub struct StrReplaceEditorTool {
    tree: SharedFileTree,
}

impl StrReplaceEditorTool {
    pub fn new(tree: SharedFileTree) -> Self {
        Self { tree }
    }

    fn run(&self, command: EditorCommand) -> Result<String, String> {
        let mut tree = self.tree.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = match command {
            EditorCommand::View { path, view_range } => {
                tree.view_file(&path, view_range.map(ViewRange::from))
            }
            EditorCommand::Create { path, file_text } => {
                tree.create_file_with_parents(&path, file_text.as_deref().unwrap_or(""))
            }
            EditorCommand::StrReplace {
                path,
                old_str,
                new_str,
            } => tree.replace_in_file(
                &path,
                old_str.as_deref().unwrap_or(""),
                new_str.as_deref().unwrap_or(""),
            ),
            EditorCommand::Insert {
                path,
                insert_line,
                new_str,
            } => {
                let line = insert_line.unwrap_or(0).max(0) as usize;
                tree.insert_in_file(&path, line, new_str.as_deref().unwrap_or(""))
            }
            EditorCommand::UndoEdit => return Err(UNDO_UNSUPPORTED.to_string()),
        };
        outcome.map_err(|e| format!("Error: {e}"))
    }
}

#[async_trait]
impl Tool for StrReplaceEditorTool {
    fn name(&self) -> &str {
        "str_replace_editor"
    }

    fn description(&self) -> &str {
        "A text editor tool for viewing and editing files in the virtual file system. \
         Supports viewing file contents, creating new files, replacing strings, \
         inserting text at specific lines, and more."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["view", "create", "str_replace", "insert", "undo_edit"],
                    "description": "The command to execute: view, create, str_replace, insert, or undo_edit"
                },
                "path": {
                    "type": "string",
                    "description": "The file path to operate on"
                },
                "file_text": {
                    "type": "string",
                    "description": "The content of the file (for create command)"
                },
                "insert_line": {
                    "type": "number",
                    "description": "The line number to insert text at (for insert command)"
                },
                "new_str": {
                    "type": "string",
                    "description": "The new string to replace or insert"
                },
                "old_str": {
                    "type": "string",
                    "description": "The old string to replace (for str_replace command)"
                },
                "view_range": {
                    "type": "array",
                    "items": { "type": "number" },
                    "description": "The line range to view [start, end] (for view command)"
                }
            },
            "required": ["command", "path"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        call_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let command: EditorCommand = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        debug!(command = command.name(), "str_replace_editor");

        Ok(match self.run(command) {
            Ok(output) => ToolResult::ok(call_id, output),
            Err(output) => ToolResult::failed(call_id, output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uigen_vfs::FileTree;

    fn tool_with(files: &[(&str, &str)]) -> (StrReplaceEditorTool, SharedFileTree) {
        let mut tree = FileTree::new();
        for (path, content) in files {
            tree.create_file_with_parents(path, content).unwrap();
        }
        let shared = uigen_vfs::shared(tree);
        (StrReplaceEditorTool::new(shared.clone()), shared)
    }

    fn read(tree: &SharedFileTree, path: &str) -> String {
        tree.lock().unwrap().read_file(path).unwrap().to_string()
    }

    #[test]
    fn tool_definition() {
        let (tool, _) = tool_with(&[]);
        assert_eq!(tool.name(), "str_replace_editor");
        let schema = tool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["command", "path"]));
        assert_eq!(schema["properties"]["command"]["enum"][4], "undo_edit");
    }

    #[tokio::test]
    async fn create_app_jsx() {
        let (tool, tree) = tool_with(&[]);
        let result = tool
            .execute(
                "toolu_1",
                json!({
                    "command": "create",
                    "path": "/App.jsx",
                    "file_text": "export default function App() { return <div/>; }"
                }),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.call_id, "toolu_1");
        assert!(result.output.contains("successfully"));
        assert_eq!(
            read(&tree, "/App.jsx"),
            "export default function App() { return <div/>; }"
        );
    }

    #[tokio::test]
    async fn create_defaults_to_empty_file() {
        let (tool, tree) = tool_with(&[]);
        let result = tool
            .execute("t", json!({"command": "create", "path": "/components/Empty.jsx"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(read(&tree, "/components/Empty.jsx"), "");
    }

    #[tokio::test]
    async fn view_file_and_range() {
        let (tool, _) = tool_with(&[("/test.txt", "hello world\nsecond\nthird")]);
        let result = tool
            .execute("t", json!({"command": "view", "path": "/test.txt"}))
            .await
            .unwrap();
        assert!(result.output.contains("hello world"));

        let result = tool
            .execute("t", json!({"command": "view", "path": "/test.txt", "view_range": [2, -1]}))
            .await
            .unwrap();
        assert_eq!(result.output, "2\tsecond\n3\tthird");
    }

    #[tokio::test]
    async fn str_replace_updates_file() {
        let (tool, tree) = tool_with(&[("/test.txt", "hello world")]);
        let result = tool
            .execute(
                "t",
                json!({"command": "str_replace", "path": "/test.txt", "old_str": "world", "new_str": "universe"}),
            )
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("successfully"));
        assert_eq!(read(&tree, "/test.txt"), "hello universe");
    }

    #[tokio::test]
    async fn str_replace_missing_text_reports_error() {
        let (tool, tree) = tool_with(&[("/test.txt", "hello world")]);
        let result = tool
            .execute(
                "t",
                json!({"command": "str_replace", "path": "/test.txt", "old_str": "absent", "new_str": "x"}),
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error: "));
        assert_eq!(read(&tree, "/test.txt"), "hello world");
    }

    #[tokio::test]
    async fn insert_defaults_to_top() {
        let (tool, tree) = tool_with(&[("/test.txt", "line 1\nline 2")]);
        let result = tool
            .execute("t", json!({"command": "insert", "path": "/test.txt", "new_str": "header"}))
            .await
            .unwrap();
        assert!(result.output.contains("successfully"));
        assert_eq!(read(&tree, "/test.txt"), "header\nline 1\nline 2");

        tool.execute(
            "t",
            json!({"command": "insert", "path": "/test.txt", "insert_line": 1, "new_str": "inserted line"}),
        )
        .await
        .unwrap();
        assert_eq!(read(&tree, "/test.txt"), "header\ninserted line\nline 1\nline 2");
    }

    #[tokio::test]
    async fn undo_edit_is_unsupported() {
        let (tool, tree) = tool_with(&[("/a.txt", "a")]);
        let result = tool
            .execute("t", json!({"command": "undo_edit", "path": "/a.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.output, UNDO_UNSUPPORTED);
        assert_eq!(read(&tree, "/a.txt"), "a");
    }

    #[tokio::test]
    async fn view_missing_file_is_error_text() {
        let (tool, _) = tool_with(&[]);
        let result = tool
            .execute("t", json!({"command": "view", "path": "/nope.jsx"}))
            .await
            .unwrap();
        assert_eq!(result.output, "Error: File not found: /nope.jsx");
    }

    #[tokio::test]
    async fn malformed_input_is_invalid_arguments() {
        let (tool, _) = tool_with(&[]);
        let err = tool
            .execute("t", json!({"command": "explode", "path": "/a"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = tool
            .execute("t", json!({"command": "create"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
