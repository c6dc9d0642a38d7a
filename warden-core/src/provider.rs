//! Text generation provider abstraction
//!
//! The agent treats the model as an untrusted text generator behind the
//! [`ChatProvider`] trait: it hands over the transcript and the tool
//! definitions, demands tool use via [`ToolChoice`], and validates whatever
//! comes back. Implementations adapt a concrete model API (or a scripted
//! test double) to this interface.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::types::{Message, ToolCall, ToolChoice, ToolDefinition};

/// Errors from a provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Network(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// One completed model turn
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Freeform assistant text. With tool use enforced this should be empty
    /// or negligible; the agent treats substantial text here as a protocol
    /// violation.
    pub content: String,
    /// Tool invocations the model requested, in order
    pub tool_calls: Vec<ToolCall>,
}

impl ProviderResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Incremental output for streaming providers
#[derive(Debug, Clone)]
pub enum StreamEvent {
    TextDelta(String),
    ToolCall(ToolCall),
    Stop,
}

/// A model backend the agent can drive
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logs and events
    fn name(&self) -> &str;

    /// Generate one turn from the transcript
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Stream a turn incrementally. The default buffers `generate` into a
    /// short event sequence; streaming backends override this.
    async fn generate_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        let response = self.generate(messages, tools, tool_choice).await?;
        let mut events = Vec::new();
        if !response.content.is_empty() {
            events.push(Ok(StreamEvent::TextDelta(response.content)));
        }
        for call in response.tool_calls {
            events.push(Ok(StreamEvent::ToolCall(call)));
        }
        events.push(Ok(StreamEvent::Stop));
        Ok(Box::pin(futures::stream::iter(events)))
    }
}
