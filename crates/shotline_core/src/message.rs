//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text message sent to a language model.
///
/// # Examples
///
/// ```
/// use shotline_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Draft the storyboard for episode 2.");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
