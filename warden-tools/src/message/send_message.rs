use crate::prelude::*;

/// Largest payload the messaging channel accepts. Anything bigger belongs
/// in a file.
pub const MAX_MESSAGE_BYTES: usize = 10_000;

/// Input for messaging the user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendMessageInput {
    /// Short plain-text message for the user
    pub message: String,
}

/// The one user-facing tool: its successful output ends the turn and is
/// shown to the user. Oversized or markup-heavy payloads are rejected with
/// a hint the generator sees; the raw payload never reaches the user.
#[derive(Default)]
pub struct SendMessageTool;

impl SendMessageTool {
    pub fn new() -> Self {
        Self
    }
}

fn looks_like_markup(message: &str) -> bool {
    let trimmed = message.trim_start();
    trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<?xml")
        || message.contains("```")
        || message.matches('<').count() > 20
}

impl Tool for SendMessageTool {
    type Input = SendMessageInput;

    fn name(&self) -> &str {
        "send_message"
    }

    fn description(&self) -> &str {
        "Send a short plain-text message to the user. This is the only way to talk to \
         the user; put long or formatted content in a file instead."
    }

    fn user_facing(&self) -> bool {
        true
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        if input.message.len() > MAX_MESSAGE_BYTES {
            let hint = if looks_like_markup(&input.message) {
                "Message rejected: it looks like a document, not a chat message. \
                 Save the content with write_file and send a short message naming the file."
            } else {
                "Message rejected: it exceeds the size limit for chat messages. \
                 Save the content with write_file and send a short summary instead."
            };
            return Err(ToolError::Custom(hint.to_string()));
        }
        Ok(ToolOutput::text(input.message))
    }
}
