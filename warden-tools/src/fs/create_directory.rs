use std::path::PathBuf;
use std::sync::Arc;

use warden_core::permission::PermissionBroker;

use crate::fs::require_approval;
use crate::prelude::*;

/// Input for creating a directory
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateDirectoryInput {
    /// Path of the directory to create (relative to the working directory or absolute)
    pub path: PathBuf,
}

/// Tool for creating directories, including intermediate ones
pub struct CreateDirectoryTool {
    broker: Arc<PermissionBroker>,
}

impl CreateDirectoryTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self { broker }
    }
}

impl Tool for CreateDirectoryTool {
    type Input = CreateDirectoryInput;

    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory (and any missing parents) inside the working directory. \
         Requires approval."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let path = self.broker.canonicalize(&input.path);
        require_approval(&self.broker, "Create directory", &path, None).await?;

        tokio::fs::create_dir_all(&path).await?;
        Ok(ToolOutput::text(format!(
            "Created directory {}",
            path.display()
        )))
    }
}
