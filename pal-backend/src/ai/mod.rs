pub mod openai;

pub use openai::OpenAIClient;

use crate::models::MessageRole;
use serde::{Deserialize, Serialize};

/// A single turn sent to the chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
