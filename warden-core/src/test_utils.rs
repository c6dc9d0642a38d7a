//! Test doubles for the provider, approval, and hook seams
//!
//! Available to downstream crates behind the `test-utils` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::events::{AgentEvent, AgentHook};
use crate::permission::{ApprovalHandler, ApprovalRequest, PermissionDecision};
use crate::provider::{ChatProvider, ProviderError, ProviderResponse};
use crate::types::{Message, ToolCall, ToolChoice, ToolDefinition};

/// Scripted provider that plays back queued responses in order.
///
/// Running past the script returns a `Model` error, which makes a test that
/// loops longer than expected fail loudly instead of hanging.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text-only turn (a protocol violation under enforced tool use)
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.responses.lock().push(ProviderResponse {
            content: content.into(),
            tool_calls: Vec::new(),
        });
        self
    }

    /// Queue a turn containing one tool call
    pub fn with_tool_call(self, id: &str, name: &str, arguments: Value) -> Self {
        self.responses.lock().push(ProviderResponse {
            content: String::new(),
            tool_calls: vec![ToolCall::new(id, name, arguments)],
        });
        self
    }

    /// Queue a turn containing several tool calls
    pub fn with_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.responses.lock().push(ProviderResponse {
            content: String::new(),
            tool_calls: calls,
        });
        self
    }

    /// How many times `generate` was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The transcript snapshot sent with each call
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
        _tool_choice: ToolChoice,
    ) -> Result<ProviderResponse, ProviderError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(messages.to_vec());
        let responses = self.responses.lock();
        responses
            .get(index)
            .cloned()
            .ok_or_else(|| ProviderError::Model(format!("mock script exhausted at call {index}")))
    }
}

/// Approves everything
pub struct AllowAll;

#[async_trait]
impl ApprovalHandler for AllowAll {
    async fn prompt(&self, _request: &ApprovalRequest) -> PermissionDecision {
        PermissionDecision::Allowed
    }
}

/// Refuses everything
pub struct DenyAll;

#[async_trait]
impl ApprovalHandler for DenyAll {
    async fn prompt(&self, _request: &ApprovalRequest) -> PermissionDecision {
        PermissionDecision::Denied
    }
}

/// Answers every prompt with a fixed decision and records what was asked
pub struct CountingApprover {
    decision: PermissionDecision,
    requests: Mutex<Vec<ApprovalRequest>>,
}

impl CountingApprover {
    pub fn new(decision: PermissionDecision) -> Self {
        Self {
            decision,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<ApprovalRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ApprovalHandler for CountingApprover {
    async fn prompt(&self, request: &ApprovalRequest) -> PermissionDecision {
        self.requests.lock().push(request.clone());
        self.decision
    }
}

/// Plays back a fixed sequence of decisions, then denies
pub struct ScriptedApprover {
    decisions: Mutex<Vec<PermissionDecision>>,
    next: AtomicUsize,
}

impl ScriptedApprover {
    pub fn new(decisions: Vec<PermissionDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions),
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ApprovalHandler for ScriptedApprover {
    async fn prompt(&self, _request: &ApprovalRequest) -> PermissionDecision {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.decisions
            .lock()
            .get(index)
            .copied()
            .unwrap_or(PermissionDecision::Denied)
    }
}

/// Records every emitted event for assertions
#[derive(Default)]
pub struct RecordingHook {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingHook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AgentHook for RecordingHook {
    async fn on_event(&self, event: &AgentEvent) {
        self.events.lock().push(event.clone());
    }
}
