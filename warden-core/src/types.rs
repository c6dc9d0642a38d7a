//! Protocol types shared by the history, dispatcher, and enforcement loop
//!
//! These types abstract over generator-specific SDKs so the loop, the
//! permission broker, and the executors never depend on a wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the conversation transcript.
///
/// `tool_call_id` links a `Tool` message back to the call it answers.
/// `tool_calls` is populated only on assistant messages that requested
/// tools, so the exchange can be replayed to the generator verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message with text content only
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message carrying tool calls
    pub fn assistant_with_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_call_id: None,
            tool_calls,
        }
    }

    /// Create a tool message answering the call identified by `tool_call_id`
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// A structured tool invocation produced by the generator.
///
/// Always treated as untrusted input: the name may not exist, arguments
/// may be malformed, required parameters may be missing. The dispatcher
/// validates all of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id assigned by the generator, echoed back in the result
    pub id: String,
    /// Tool name (must match a catalog entry)
    pub name: String,
    /// Arguments as JSON (must be an object)
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Definition of a tool as advertised to the generator.
///
/// The schema is derived once from the tool's typed input; its `required`
/// array drives argument validation in the dispatcher. The generator must
/// reproduce this name and parameter shape exactly; any mismatch is a
/// validation failure, not a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the tool's name() method)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Names of parameters the schema marks as required, in schema order
    pub fn required_parameters(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Names of all declared parameters, in schema order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Whether the generator is required to call a tool or may answer freely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The generator must respond with at least one tool call
    #[default]
    Required,
    /// The generator may call tools or answer with plain text
    Auto,
}

/// Outcome of dispatching one tool call.
///
/// Always a value: executor faults, permission denials, and validation
/// failures all end up here rather than unwinding through the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call this result answers
    pub tool_call_id: String,
    /// Whether the tool ran to completion successfully
    pub success: bool,
    /// Output content on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Failure description on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the content is the turn's user-facing answer
    #[serde(default)]
    pub user_facing: bool,
}

impl ToolResult {
    /// Successful result with output content
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: Some(content.into()),
            error: None,
            user_facing: false,
        }
    }

    /// Failed result with an error description
    pub fn failure(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: None,
            error: Some(error.into()),
            user_facing: false,
        }
    }

    /// Mark this result as user-facing
    pub fn with_user_facing(mut self, user_facing: bool) -> Self {
        self.user_facing = user_facing;
        self
    }

    /// Text recorded in the transcript for this result
    pub fn transcript_text(&self) -> String {
        if self.success {
            self.content.clone().unwrap_or_default()
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("unknown failure")
            )
        }
    }
}
