//! Tool trait and execution output types
//!
//! Tools define a typed input with `#[derive(Deserialize, JsonSchema)]`;
//! the schema is generated from the type and advertised to the generator,
//! and the same `required` list drives dispatcher-side validation.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload a tool produces on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolOutput {
    /// Plain text response
    Text(String),
    /// Structured JSON data
    Json(Value),
}

impl ToolOutput {
    /// Create a text output from a string
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a JSON output from any serializable type
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Text representation for the transcript
    pub fn as_text(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            ToolOutput::Json(v) => v.to_string(),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolOutput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Path validation failed: {0}")]
    PathValidation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Blocked dangerous pattern: {0}")]
    SecurityRejection(String),

    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_string())
    }
}

/// Trait for implementing tools the generator may invoke.
///
/// # Example
///
/// ```rust
/// use warden_core::{Tool, ToolError, ToolOutput};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct GreetInput {
///     /// Name to greet
///     name: String,
/// }
///
/// struct GreetTool;
///
/// impl Tool for GreetTool {
///     type Input = GreetInput;
///
///     fn name(&self) -> &str { "greet" }
///     fn description(&self) -> &str { "Greet someone by name" }
///
///     fn execute(&self, input: Self::Input) -> impl std::future::Future<Output = Result<ToolOutput, ToolError>> + Send {
///         async move { Ok(format!("Hello, {}!", input.name).into()) }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The input type for this tool. Must implement `Deserialize` and `JsonSchema`.
    type Input: DeserializeOwned + JsonSchema;

    /// The name of the tool (e.g., "read_file", "execute_command")
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// True when a successful result is the turn's user-facing answer.
    ///
    /// The enforcement loop returns the trailing run of user-facing results
    /// as the final response instead of looping back to the generator.
    fn user_facing(&self) -> bool {
        false
    }

    /// Execute the tool with typed input
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl std::future::Future<Output = Result<ToolOutput, ToolError>> + Send;

    /// Get the JSON schema for this tool's input.
    ///
    /// Automatically implemented from the `JsonSchema` derive on `Input`.
    fn input_schema(&self) -> Value {
        let schema = schemars::schema_for!(Self::Input);
        serde_json::to_value(schema).expect("Failed to serialize schema")
    }
}

/// Object-safe trait for dynamic tool dispatch (used by the catalog).
///
/// Users should implement `Tool` instead and use `box_tool()` to convert.
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn user_facing(&self) -> bool;
    fn input_schema(&self) -> Value;
    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolOutput, ToolError>> + Send + '_>,
    >;
}

/// Convert a `Tool` into a type-erased `Box<dyn DynTool>` for the catalog.
pub fn box_tool<T: Tool + 'static>(tool: T) -> Box<dyn DynTool> {
    Box::new(ToolWrapper(tool))
}

/// Create a `Vec<Box<dyn DynTool>>` from heterogeneous tool types.
///
/// ```ignore
/// let catalog = ToolCatalog::new(box_tools![ReadFileTool::new(broker.clone()),
///     WriteFileTool::new(broker.clone()), SendMessageTool::new()])?;
/// ```
#[macro_export]
macro_rules! box_tools {
    ($($tool:expr),* $(,)?) => {
        vec![$($crate::tool::box_tool($tool)),*]
    };
}

/// Internal wrapper that implements DynTool for any Tool
struct ToolWrapper<T>(T);

impl<T: Tool + 'static> DynTool for ToolWrapper<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn user_facing(&self) -> bool {
        self.0.user_facing()
    }

    fn input_schema(&self) -> Value {
        self.0.input_schema()
    }

    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolOutput, ToolError>> + Send + '_>,
    > {
        Box::pin(async move {
            let typed_input: T::Input = serde_json::from_value(input)
                .map_err(|e| ToolError::Custom(format!("Failed to deserialize input: {}", e)))?;

            self.0.execute(typed_input).await
        })
    }
}
