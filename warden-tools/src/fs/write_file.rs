use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use warden_core::permission::PermissionBroker;

use crate::fs::require_approval;
use crate::prelude::*;

/// Write mode for file operations
#[derive(Debug, Deserialize, Serialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Overwrite the file if it exists, create if it doesn't
    #[default]
    Rewrite,
    /// Append to the end of the file if it exists, create if it doesn't
    Append,
}

/// Input for writing a file
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileInput {
    /// Path to the file to write (relative to the working directory or absolute)
    pub path: PathBuf,

    /// Content to write to the file
    pub content: String,

    /// Write mode: 'rewrite' (default) or 'append'
    #[serde(default)]
    pub mode: WriteMode,
}

/// Tool for writing content to files
pub struct WriteFileTool {
    broker: Arc<PermissionBroker>,
}

impl WriteFileTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self { broker }
    }
}

impl Tool for WriteFileTool {
    type Input = WriteFileInput;

    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file inside the working directory. Can either overwrite the \
         file or append to it. Requires approval."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let path = self.broker.canonicalize(&input.path);
        require_approval(&self.broker, "Write file", &path, None).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = OpenOptions::new();
        match input.mode {
            WriteMode::Rewrite => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let mut file = options.open(&path).await?;
        file.write_all(input.content.as_bytes()).await?;
        file.flush().await?;

        Ok(ToolOutput::text(format!(
            "Wrote {} bytes to {}",
            input.content.len(),
            path.display()
        )))
    }
}
