//! Run observability
//!
//! The agent emits an [`AgentEvent`] at each step of the enforcement loop.
//! Hosts register [`AgentHook`]s to drive progress UI, logging, or test
//! assertions without touching the loop itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{ToolCall, ToolResult};

/// A step in an agent run
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A run began with this user input
    RunStarted { input: String },
    /// A model call is going out with this many transcript messages
    ModelCallStarted { messages: usize },
    /// The model answered with this many tool calls
    ModelCallCompleted { tool_calls: usize },
    /// The model broke the tool protocol (no tool calls, or freeform text)
    ProtocolViolation { detail: String },
    /// A corrective retry was issued
    CorrectionIssued { attempt: u32 },
    /// A tool call is about to execute
    ToolDispatched { call: ToolCall },
    /// A tool call finished (success or failure, both are results)
    ToolCompleted { result: ToolResult },
    /// The run produced a final user-facing answer
    RunCompleted { response: String },
    /// The run ended in error
    RunFailed { error: String },
}

/// Observes agent runs. All methods default to no-ops so hooks implement
/// only what they care about.
#[async_trait]
pub trait AgentHook: Send + Sync {
    async fn on_event(&self, _event: &AgentEvent) {}
}

/// Fan-out to a list of hooks
#[derive(Default, Clone)]
pub(crate) struct HookSet {
    hooks: Vec<Arc<dyn AgentHook>>,
}

impl HookSet {
    pub fn push(&mut self, hook: Arc<dyn AgentHook>) {
        self.hooks.push(hook);
    }

    pub async fn emit(&self, event: AgentEvent) {
        for hook in &self.hooks {
            hook.on_event(&event).await;
        }
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet").field("hooks", &self.hooks.len()).finish()
    }
}
