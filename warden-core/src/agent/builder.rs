//! Builder for [`Agent`]

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::catalog::ToolCatalog;
use crate::dispatch::Dispatcher;
use crate::error::AgentError;
use crate::events::HookSet;
use crate::history::MessageHistory;
use crate::provider::ChatProvider;
use crate::tool::DynTool;

use super::{Agent, DEFAULT_MAX_CORRECTION_ATTEMPTS, DEFAULT_MAX_ITERATIONS};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a coding assistant. You can only act \
through the tools provided to you. Every response must be one or more tool calls; \
use the messaging tool to talk to the user.";

#[derive(Default)]
pub struct AgentBuilder {
    provider: Option<Arc<dyn ChatProvider>>,
    system_prompt: Option<String>,
    tools: Vec<Box<dyn DynTool>>,
    cancel: Option<CancellationToken>,
    max_correction_attempts: Option<u32>,
    max_iterations: Option<u32>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: impl ChatProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn provider_arc(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Add tools, typically via [`crate::box_tools!`]
    pub fn with_tools(mut self, tools: Vec<Box<dyn DynTool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_tool(mut self, tool: Box<dyn DynTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_correction_attempts(mut self, attempts: u32) -> Self {
        self.max_correction_attempts = Some(attempts);
        self
    }

    pub fn max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Configuration("no provider configured".to_string()))?;
        if self.tools.is_empty() {
            return Err(AgentError::Configuration(
                "at least one tool is required; the agent has no other way to respond".to_string(),
            ));
        }
        let catalog = Arc::new(
            ToolCatalog::new(self.tools)
                .map_err(|e| AgentError::Configuration(e.to_string()))?,
        );
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Agent {
            dispatcher: Dispatcher::new(catalog.clone()),
            catalog,
            provider,
            history: RwLock::new(MessageHistory::new(system_prompt)),
            hooks: RwLock::new(HookSet::default()),
            cancel: self.cancel.unwrap_or_default(),
            max_correction_attempts: self
                .max_correction_attempts
                .unwrap_or(DEFAULT_MAX_CORRECTION_ATTEMPTS),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        })
    }
}
