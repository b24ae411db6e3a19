use crate::llm::prompts;
use crate::llm::ChatMessage;

/// One user message asking for a single-sentence summary of `commits`.
pub fn summary_messages(commits: &[String]) -> Vec<ChatMessage> {
    let user = format!(
        "{instructions}\n{commits}",
        instructions = prompts::SUMMARY_INSTRUCTIONS,
        commits = commits.join("\n")
    );

    vec![ChatMessage::user(user)]
}

/// System prompt, the fixed few-shot exchanges, then `summary` as the final
/// user turn.
pub fn translation_messages(summary: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + prompts::TRANSLATION_EXAMPLES.len() * 2);
    messages.push(ChatMessage::system(prompts::TRANSLATION_SYSTEM));

    for (english, ukrainian) in prompts::TRANSLATION_EXAMPLES {
        messages.push(ChatMessage::user(english));
        messages.push(ChatMessage::assistant(ukrainian));
    }

    messages.push(ChatMessage::user(summary));
    messages
}
