//! Filesystem tools
//!
//! Every tool here holds the shared [`PermissionBroker`]: the target is
//! resolved with [`PermissionBroker::canonicalize`] so traversal and symlink
//! tricks land inside the working tree, then the operation is cleared with
//! the broker before anything touches the disk. Reads and lists go through
//! the same gate as mutations; a denied approver stops them all.

mod create_directory;
mod delete_file;
mod list_directory;
mod read_file;
mod write_file;

pub use create_directory::CreateDirectoryTool;
pub use delete_file::DeleteFileTool;
pub use list_directory::ListDirectoryTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;

use std::sync::Arc;

use warden_core::permission::{PermissionBroker, PermissionDecision};
use warden_core::tool::{DynTool, ToolError};
use warden_core::box_tools;

/// All filesystem tools sharing one broker
pub fn all_tools(broker: Arc<PermissionBroker>) -> Vec<Box<dyn DynTool>> {
    box_tools![
        ReadFileTool::new(broker.clone()),
        WriteFileTool::new(broker.clone()),
        DeleteFileTool::new(broker.clone()),
        CreateDirectoryTool::new(broker.clone()),
        ListDirectoryTool::new(broker),
    ]
}

/// Only the tools that mutate the filesystem
pub fn mutative_tools(broker: Arc<PermissionBroker>) -> Vec<Box<dyn DynTool>> {
    box_tools![
        WriteFileTool::new(broker.clone()),
        DeleteFileTool::new(broker.clone()),
        CreateDirectoryTool::new(broker),
    ]
}


/// Clear a mutating operation with the broker, mapping refusal to a tool error
pub(crate) async fn require_approval(
    broker: &PermissionBroker,
    operation: &str,
    path: &std::path::Path,
    details: Option<String>,
) -> Result<(), ToolError> {
    let decision = broker.request(operation, path, details).await;
    if decision == PermissionDecision::Denied {
        return Err(ToolError::PermissionDenied(format!(
            "{} was not approved for {}",
            operation,
            path.display()
        )));
    }
    Ok(())
}
