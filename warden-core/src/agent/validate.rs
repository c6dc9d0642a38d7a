//! Protocol validation for model output
//!
//! With tool use enforced, a turn without tool calls is a protocol
//! violation. These heuristics tell a model that *tried* to call a tool in
//! text (and needs the exact syntax spelled out) from one that answered in
//! prose (and needs a generic reminder).

use crate::types::ToolDefinition;

/// Whether freeform text looks like a botched tool invocation:
/// function-call fragments naming a known tool, import statements, or
/// tool-call-shaped JSON.
pub(super) fn looks_like_tool_call_attempt(text: &str, definitions: &[ToolDefinition]) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    for def in definitions {
        if trimmed.contains(&format!("{}(", def.name)) {
            return true;
        }
    }

    if trimmed
        .lines()
        .any(|line| {
            let line = line.trim_start();
            line.starts_with("import ") || line.starts_with("from ")
        })
    {
        return true;
    }

    // Tool-call-shaped JSON, even when it doesn't parse cleanly.
    if trimmed.contains("\"name\"") && trimmed.contains("\"arguments\"") {
        return true;
    }
    if trimmed.contains("<tool_call") || trimmed.contains("function_call") {
        return true;
    }

    false
}

/// Whether text is an internal payload the user should never see raw
pub(super) fn looks_like_internal_payload(text: &str, definitions: &[ToolDefinition]) -> bool {
    let trimmed = text.trim();
    looks_like_tool_call_attempt(trimmed, definitions)
        || (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Correction spelling out the full catalog with exact call shapes, for a
/// model that attempted tool syntax in plain text
pub(super) fn catalog_correction(definitions: &[ToolDefinition]) -> String {
    let mut text = String::from(
        "Your last response was plain text, not a tool call. You must respond \
         with tool calls using the tool-calling interface, never by writing \
         code or JSON in your message. Available tools:\n",
    );
    for def in definitions {
        text.push_str(&format!(
            "- {}({}): {}\n",
            def.name,
            def.parameter_names().join(", "),
            def.description
        ));
    }
    text.push_str("Respond again using only tool calls.");
    text
}

/// Generic correction for a prose answer with no tool syntax in it
pub(super) fn generic_correction() -> String {
    "Your last response contained no tool calls. Every response must be one \
     or more tool calls; use the messaging tool to communicate with the user. \
     Respond again using only tool calls."
        .to_string()
}
