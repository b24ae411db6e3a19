pub mod noop;
pub mod ollama;
pub mod prompt_builder;
mod prompts;

use thiserror::Error;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message in a conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ways a single chat call can fail. The `Display` form is what the
/// operator ends up seeing in place of generated text.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Error connecting to Ollama: {0}")]
    Transport(String),

    #[error("Error: Unexpected response format from Ollama.")]
    UnexpectedFormat,

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Trait for talking to a text-generation backend.
///
/// Implementations always hand back a string: failures are rendered into
/// the returned text instead of being propagated.
pub trait TextGenerator {
    fn generate(&self, messages: &[ChatMessage]) -> String;
}
