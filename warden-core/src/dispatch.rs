//! Tool call dispatch
//!
//! The dispatcher is the boundary between the untrusted generator output and
//! the executors. Every failure mode — unknown tool, malformed arguments,
//! executor error, even an executor panic — is converted into a failed
//! `ToolResult` here. Nothing past this point is allowed to abort the session.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::catalog::ToolCatalog;
use crate::types::{ToolCall, ToolResult};

/// Routes validated tool calls to their executors.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
}

impl Dispatcher {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this dispatcher routes against
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Validate and execute a single tool call.
    ///
    /// Never panics and never returns an error: the outcome is always a
    /// `ToolResult` the loop can record and feed back to the generator.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.catalog.get(&call.name) else {
            return ToolResult::failure(
                &call.id,
                format!("Unknown tool '{}'. Use only the tools provided.", call.name),
            );
        };

        let Some(args) = call.arguments.as_object() else {
            let type_name = json_type_name(&call.arguments);
            return ToolResult::failure(
                &call.id,
                format!("Tool arguments must be a JSON object, got: {}", type_name),
            );
        };

        // Required parameters come from the tool's own schema; the first
        // missing one is named so the generator can correct itself.
        if let Some(definition) = self.catalog.definition(&call.name) {
            for required in definition.required_parameters() {
                if !args.contains_key(required) {
                    return ToolResult::failure(
                        &call.id,
                        format!(
                            "Missing required parameter '{}' for tool '{}'",
                            required, call.name
                        ),
                    );
                }
            }
        }

        let execution = AssertUnwindSafe(tool.execute_raw(call.arguments.clone())).catch_unwind();

        match execution.await {
            Ok(Ok(output)) => ToolResult::success(&call.id, output.as_text())
                .with_user_facing(tool.user_facing()),
            Ok(Err(error)) => {
                ToolResult::failure(&call.id, error.to_string()).with_user_facing(tool.user_facing())
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                ToolResult::failure(
                    &call.id,
                    format!("Tool '{}' failed unexpectedly: {}", call.name, detail),
                )
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
