use std::path::PathBuf;
use std::sync::Arc;

use warden_core::permission::PermissionBroker;

use crate::fs::require_approval;
use crate::prelude::*;

/// Input for deleting a file
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFileInput {
    /// Path to the file to delete (relative to the working directory or absolute)
    pub path: PathBuf,
}

/// Tool for deleting a single file. Directories are refused; there is no
/// recursive delete.
pub struct DeleteFileTool {
    broker: Arc<PermissionBroker>,
}

impl DeleteFileTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self { broker }
    }
}

impl Tool for DeleteFileTool {
    type Input = DeleteFileInput;

    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a single file inside the working directory. Requires approval."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let path = self.broker.canonicalize(&input.path);
        require_approval(&self.broker, "Delete file", &path, None).await?;

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            ToolError::Custom(format!("Could not delete {}: {}", path.display(), e))
        })?;
        if metadata.is_dir() {
            return Err(ToolError::Custom(format!(
                "{} is a directory; only single files can be deleted",
                path.display()
            )));
        }

        tokio::fs::remove_file(&path).await?;
        Ok(ToolOutput::text(format!("Deleted {}", path.display())))
    }
}
