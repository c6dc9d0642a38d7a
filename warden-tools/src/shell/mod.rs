//! Sandboxed shell executor

mod execute_command;
pub mod policy;

pub use execute_command::{ExecuteCommandTool, DEFAULT_TIMEOUT_SECS};
