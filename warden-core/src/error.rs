//! Agent-level error types
//!
//! Tool failures never surface here — the dispatcher converts those into
//! failed [`crate::types::ToolResult`] values the model sees and can react
//! to. These errors are for the run itself going wrong: the provider
//! failing, the model never complying with the tool protocol, or the run
//! being cancelled.

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model did not produce a tool call after {attempts} correction attempts")]
    ToolUseNotEnforced { attempts: u32 },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Run exceeded {0} iterations without completing")]
    IterationLimit(u32),

    #[error("Run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AgentError>;
