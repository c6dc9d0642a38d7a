//! Agent orchestration with enforced tool use
//!
//! The agent drives an untrusted text generator through a strict protocol:
//! every model turn must be tool calls, freeform text triggers corrective
//! retries, and the only way output reaches the user is through a
//! user-facing tool result.

mod builder;
mod run;
mod validate;

pub use builder::AgentBuilder;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::catalog::ToolCatalog;
use crate::dispatch::Dispatcher;
use crate::events::{AgentEvent, AgentHook, HookSet};
use crate::history::MessageHistory;
use crate::provider::ChatProvider;

/// Default cap on corrective retries within one turn
pub const DEFAULT_MAX_CORRECTION_ATTEMPTS: u32 = 10;

/// Default cap on model calls within one turn
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

/// Orchestrates model calls and tool execution for a conversation.
///
/// Built with [`Agent::builder`]. `run` drives one user turn to completion;
/// the transcript persists across turns until [`Agent::clear_history`].
pub struct Agent {
    pub(super) provider: Arc<dyn ChatProvider>,
    pub(super) catalog: Arc<ToolCatalog>,
    pub(super) dispatcher: Dispatcher,
    pub(super) history: RwLock<MessageHistory>,
    pub(super) hooks: RwLock<HookSet>,
    pub(super) cancel: CancellationToken,
    pub(super) max_correction_attempts: u32,
    pub(super) max_iterations: u32,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Register a hook observing run events
    pub fn add_hook(&self, hook: impl AgentHook + 'static) {
        self.hooks.write().push(Arc::new(hook));
    }

    /// Register an already-shared hook
    pub fn add_hook_arc(&self, hook: Arc<dyn AgentHook>) {
        self.hooks.write().push(hook);
    }

    /// Token that cancels an in-flight run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current transcript snapshot
    pub fn history(&self) -> Vec<crate::types::Message> {
        self.history.read().snapshot()
    }

    /// Drop everything but the system message
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    pub(super) async fn emit(&self, event: AgentEvent) {
        let hooks = self.hooks.read().clone();
        hooks.emit(event).await;
    }
}
