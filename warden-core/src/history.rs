//! Conversation transcript
//!
//! The history is an append-only log. Readers get an owned snapshot so the
//! loop can rebuild outgoing requests without holding a lock across an
//! await point. Clearing keeps the leading system message: the transcript
//! always begins with exactly one system message.

use crate::types::Message;

/// Append-only message transcript for one session.
///
/// # Example
/// ```
/// use warden_core::{Message, MessageHistory};
///
/// let mut history = MessageHistory::new("You are a coding assistant.");
/// history.push(Message::user("create a file"));
/// assert_eq!(history.len(), 2);
///
/// history.clear();
/// assert_eq!(history.len(), 1); // system message survives
/// ```
#[derive(Debug, Clone)]
pub struct MessageHistory {
    messages: Vec<Message>,
}

impl MessageHistory {
    /// Create a history seeded with the session's system message
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Append a message to the transcript
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Owned copy of the full transcript, in order
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// The session's system message
    pub fn system_message(&self) -> &Message {
        // Constructed with one in new() and clear() preserves it.
        &self.messages[0]
    }

    /// Borrow the full transcript
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove everything except the leading system message
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_starts_with_system_message() {
        let history = MessageHistory::new("act as an assistant");
        assert_eq!(history.len(), 1);
        assert_eq!(history.system_message().role, Role::System);
        assert_eq!(history.system_message().content, "act as an assistant");
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut history = MessageHistory::new("sys");
        history.push(Message::user("first"));
        history.push(Message::assistant("second"));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[1].content, "first");
        assert_eq!(snapshot[2].content, "second");
    }

    #[test]
    fn test_clear_preserves_only_system_message() {
        let mut history = MessageHistory::new("sys");
        history.push(Message::user("hello"));
        history.push(Message::assistant("hi"));
        history.push(Message::tool("ok", "call_1"));

        history.clear();
        assert_eq!(history.len(), 1);
        assert_eq!(history.system_message().content, "sys");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut history = MessageHistory::new("sys");
        let snapshot = history.snapshot();
        history.push(Message::user("later"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }
}
