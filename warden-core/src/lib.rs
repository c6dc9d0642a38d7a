//! # Warden
//!
//! An orchestration and containment layer for tool-using AI agents.
//!
//! Warden treats the language model as an untrusted text generator: every
//! model turn must be tool calls (enforced with corrective retries), every
//! mutating tool routes through a permission broker bound to a directory
//! boundary, and the only path from model to user is a user-facing tool
//! result. Malformed output, tool failures, and even tool panics become
//! transcript values the model can react to, never crashes or leaks.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_core::{box_tools, Agent, Boundary, PermissionBroker};
//! use warden_tools::prelude::*;
//! use warden_tools::{ExecuteCommandTool, SendMessageTool, WriteFileTool};
//!
//! #[tokio::main]
//! async fn main() -> warden_core::Result<()> {
//!     let boundary = Boundary::new(".")?;
//!     let broker = Arc::new(PermissionBroker::new(boundary, Arc::new(MyPrompt)));
//!
//!     let agent = Agent::builder()
//!         .provider(MyProvider::from_env()?)
//!         .with_tools(box_tools![
//!             WriteFileTool::new(broker.clone()),
//!             ExecuteCommandTool::new(broker.clone()),
//!             SendMessageTool::new(),
//!         ])
//!         .build()?;
//!
//!     let response = agent.run("Create hello.py and run it").await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`Agent`] — the enforcement loop: demands tool calls, corrects
//!   violations, dispatches sequentially, returns user-facing output
//! - [`ToolCatalog`] / [`Dispatcher`] — name-indexed tools; every failure
//!   mode (unknown tool, bad arguments, errors, panics) becomes a failed
//!   [`ToolResult`] fed back to the model
//! - [`PermissionBroker`] / [`Boundary`] — canonicalizes paths into the
//!   working tree and gates mutations behind an [`ApprovalHandler`]
//! - [`ChatProvider`] — the model seam; implementations adapt a concrete
//!   backend

pub mod agent;
pub mod boundary;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod history;
pub mod permission;
pub mod provider;
pub mod tool;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agent::{Agent, AgentBuilder};
pub use boundary::Boundary;
pub use catalog::{CatalogError, ToolCatalog};
pub use dispatch::Dispatcher;
pub use error::{AgentError, Result};
pub use events::{AgentEvent, AgentHook};
pub use history::MessageHistory;
pub use permission::{ApprovalHandler, ApprovalRequest, PermissionBroker, PermissionDecision};
pub use provider::{ChatProvider, ProviderError, ProviderResponse, StreamEvent};
pub use tool::{box_tool, DynTool, Tool, ToolError, ToolOutput};
pub use types::{Message, Role, ToolCall, ToolChoice, ToolDefinition, ToolResult};
