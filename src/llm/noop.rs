use super::{ChatMessage, TextGenerator};

/// No-op / dummy generator for development with --no-model.
pub struct NoopClient;

impl TextGenerator for NoopClient {
    fn generate(&self, messages: &[ChatMessage]) -> String {
        let last = messages
            .last()
            .map(|m| m.content.lines().count())
            .unwrap_or(0);

        format!(
            "[DUMMY RESPONSE] {} message(s), last one {} line(s) (LLM disabled)",
            messages.len(),
            last
        )
    }
}
