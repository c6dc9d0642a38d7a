use std::path::PathBuf;
use std::sync::Arc;

use warden_core::permission::PermissionBroker;

use crate::fs::require_approval;
use crate::prelude::*;

/// Input for reading a file
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFileInput {
    /// Path to the file to read (relative to the working directory or absolute)
    pub path: PathBuf,
}

/// Tool for reading file contents
pub struct ReadFileTool {
    broker: Arc<PermissionBroker>,
}

impl ReadFileTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self { broker }
    }
}

impl Tool for ReadFileTool {
    type Input = ReadFileInput;

    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. The path is resolved inside the working directory."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let path = self.broker.canonicalize(&input.path);
        require_approval(&self.broker, "Read file", &path, None).await?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ToolError::Custom(format!("Could not read {}: {}", path.display(), e))
        })?;
        Ok(ToolOutput::text(content))
    }
}
