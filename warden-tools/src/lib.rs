//! Boundary-enforcing tools for warden agents
//!
//! Filesystem tools that canonicalize every path into the directory boundary
//! and clear mutations with the permission broker, a sandboxed shell
//! executor with an allow-list and a dangerous-pattern deny-list, and the
//! messaging tool that is the agent's only channel to the user.

pub mod fs;
pub mod message;
pub mod shell;

pub use fs::{
    CreateDirectoryTool, DeleteFileTool, ListDirectoryTool, ReadFileTool, WriteFileTool,
};
pub use message::SendMessageTool;
pub use shell::ExecuteCommandTool;

pub use fs::{all_tools as all_fs_tools, mutative_tools as mutative_fs_tools};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
    pub use warden_core::{Tool, ToolError, ToolOutput};
}
