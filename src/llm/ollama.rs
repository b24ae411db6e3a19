use std::time::Duration;

use anyhow::{Context, Result};
use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;

use super::{ChatError, ChatMessage, TextGenerator};

#[derive(Debug, Decode)]
struct OllamaMessage {
    #[musli(default)]
    content: Option<String>,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    #[musli(default)]
    message: Option<OllamaMessage>,
}

/// Connection and sampling settings for the Ollama endpoint.
#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
    pub num_ctx: u32,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    num_ctx: u32,
}

impl OllamaClient {
    pub fn new(settings: &OllamaSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.host.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            num_ctx: settings.num_ctx,
        })
    }

    /// Send one non-streamed chat request and return the reply text.
    pub fn chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        // Request structs we encode with musli::json.
        #[derive(Debug, Encode)]
        struct RequestMessage {
            role: String,
            content: String,
        }

        #[derive(Debug, Encode)]
        struct ChatOptions {
            temperature: f32,
            num_ctx: u32,
        }

        #[derive(Debug, Encode)]
        struct ChatRequest {
            model: String,
            messages: Vec<RequestMessage>,
            stream: bool,
            options: ChatOptions,
        }

        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| RequestMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: ChatOptions {
                temperature: 0.0,
                num_ctx: self.num_ctx,
            },
        };

        let body_str = json::to_string(&req_body)
            .map_err(|e| ChatError::Unexpected(format!("failed to encode Ollama JSON request: {e}")))?;

        log::trace!("Ollama request body: {body_str}");

        let url = format!("{}/api/chat", self.base_url);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| ChatError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let resp_text = resp
            .text()
            .map_err(|e| ChatError::Transport(format!("failed to read response body: {e}")))?;

        log::trace!("Ollama raw JSON response: {resp_text}");

        parse_chat_response(&resp_text)
    }
}

/// A body that is not JSON at all counts as a transport problem; JSON
/// without `message.content` is a format problem.
fn parse_chat_response(text: &str) -> Result<String, ChatError> {
    let parsed: OllamaChatResponse = json::from_str(text)
        .map_err(|e| ChatError::Transport(format!("failed to decode response JSON: {e}")))?;

    parsed
        .message
        .and_then(|m| m.content)
        .map(|content| content.trim().to_string())
        .ok_or(ChatError::UnexpectedFormat)
}

impl TextGenerator for OllamaClient {
    fn generate(&self, messages: &[ChatMessage]) -> String {
        log::debug!(
            "Calling Ollama model {:?} with {} message(s)",
            self.model,
            messages.len()
        );

        match self.chat(messages) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("{e}");
                e.to_string()
            }
        }
    }
}
