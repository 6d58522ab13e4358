//! `file_manager`: rename (move) and delete entries in the virtual tree.
//!
//! Results are small JSON documents rather than prose:
//! `{"success": true, "message": "..."}` or `{"success": false, "error": "..."}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uigen_core::error::ToolError;
use uigen_core::tool::{Tool, ToolResult};
use uigen_vfs::SharedFileTree;

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum FileCommand {
    Rename {
        path: String,
        #[serde(default)]
        new_path: Option<String>,
    },
    Delete {
        path: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize)]
struct Outcome {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Outcome {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
        }
    }

    fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

pub struct FileManagerTool {
    tree: SharedFileTree,
}

impl FileManagerTool {
    pub fn new(tree: SharedFileTree) -> Self {
        Self { tree }
    }

    fn run(&self, command: FileCommand) -> Outcome {
        match command {
            FileCommand::Rename { path, new_path } => {
                let Some(new_path) = new_path.filter(|p| !p.is_empty()) else {
                    return Outcome::err("new_path is required for rename command");
                };
                let mut tree = self.tree.lock().unwrap_or_else(|e| e.into_inner());
                match tree.try_rename(&path, &new_path) {
                    Ok(_) => Outcome::ok(format!("Successfully renamed {path} to {new_path}")),
                    Err(e) => Outcome::err(format!("Failed to rename {path} to {new_path}: {e}")),
                }
            }
            FileCommand::Delete { path } => {
                let mut tree = self.tree.lock().unwrap_or_else(|e| e.into_inner());
                match tree.try_delete(&path) {
                    Ok(_) => Outcome::ok(format!("Successfully deleted {path}")),
                    Err(e) => Outcome::err(format!("Failed to delete {path}: {e}")),
                }
            }
            FileCommand::Unknown => Outcome::err("Invalid command"),
        }
    }
}

#[async_trait]
impl Tool for FileManagerTool {
    fn name(&self) -> &str {
        "file_manager"
    }

    fn description(&self) -> &str {
        "Rename or delete files or folders in the file system. Rename can be used to \
         \"move\" a file. Rename will recursively create folders as required."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["rename", "delete"],
                    "description": "The operation to perform"
                },
                "path": {
                    "type": "string",
                    "description": "The path to the file or directory to rename or delete"
                },
                "new_path": {
                    "type": "string",
                    "description": "The new path. Only provide when renaming or moving a file."
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
        let command: FileCommand = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        debug!(?command, "file_manager");

        let outcome = self.run(command);
        let encode_failed = |e: serde_json::Error| ToolError::ExecutionFailed {
            tool_name: "file_manager".into(),
            reason: e.to_string(),
        };
        let output = serde_json::to_string(&outcome).map_err(encode_failed)?;
        let data = serde_json::to_value(&outcome).map_err(encode_failed)?;
        Ok(ToolResult {
            call_id: call_id.to_string(),
            success: outcome.success,
            output,
            data: Some(data),
        })
    }
}
