use std::path::PathBuf;
use std::sync::Arc;

use warden_core::permission::PermissionBroker;

use crate::fs::require_approval;
use crate::prelude::*;

/// Input for listing a directory
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListDirectoryInput {
    /// Directory to list (relative to the working directory or absolute).
    /// Defaults to the working directory itself.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Tool for listing directory entries
pub struct ListDirectoryTool {
    broker: Arc<PermissionBroker>,
}

impl ListDirectoryTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self { broker }
    }
}

impl Tool for ListDirectoryTool {
    type Input = ListDirectoryInput;

    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a directory inside the working directory. Directories are \
         suffixed with '/'."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let requested = input.path.unwrap_or_default();
        let path = self.broker.canonicalize(&requested);
        require_approval(&self.broker, "List directory", &path, None).await?;

        let mut reader = tokio::fs::read_dir(&path).await.map_err(|e| {
            ToolError::Custom(format!("Could not list {}: {}", path.display(), e))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                entries.push(format!("{name}/"));
            } else {
                entries.push(name);
            }
        }
        entries.sort();

        if entries.is_empty() {
            Ok(ToolOutput::text(format!("{} is empty", path.display())))
        } else {
            Ok(ToolOutput::text(entries.join("\n")))
        }
    }
}
