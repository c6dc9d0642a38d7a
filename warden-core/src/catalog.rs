//! Static tool registry
//!
//! The catalog is an immutable value built once per process and passed by
//! reference; it never changes after construction, so the definitions the
//! generator sees stay stable across the whole session.

use crate::tool::DynTool;
use crate::types::ToolDefinition;

/// Error constructing a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),
}

/// Immutable registry of the tools available to the generator.
///
/// Definitions are derived once from the tools' input schemas; `definitions()`
/// returns the same set (identity and order) for every call.
pub struct ToolCatalog {
    tools: Vec<Box<dyn DynTool>>,
    definitions: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Build a catalog from a set of boxed tools.
    ///
    /// Duplicate names are rejected at construction so a second registration
    /// can never shadow an approved tool mid-session.
    pub fn new(tools: Vec<Box<dyn DynTool>>) -> Result<Self, CatalogError> {
        let mut definitions = Vec::with_capacity(tools.len());
        for tool in &tools {
            if definitions
                .iter()
                .any(|d: &ToolDefinition| d.name == tool.name())
            {
                return Err(CatalogError::DuplicateName(tool.name().to_string()));
            }
            definitions.push(ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            });
        }
        Ok(Self { tools, definitions })
    }

    /// The fixed tool definitions, in registration order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| &**t)
    }

    /// Definition for a named tool
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
