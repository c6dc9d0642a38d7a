//! User messaging

mod send_message;

pub use send_message::{SendMessageTool, MAX_MESSAGE_BYTES};
