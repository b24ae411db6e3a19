use anyhow::Result;
use log::debug;

use crate::config::Config;
use crate::llm::TextGenerator;
use crate::llm::noop::NoopClient;
use crate::llm::ollama::OllamaClient;

/// Build the text generator based on config: Ollama when configured,
/// the dummy client when model calls are disabled.
pub fn build_text_generator(cfg: &Config) -> Result<Box<dyn TextGenerator>> {
    match &cfg.ollama {
        Some(settings) => {
            debug!(
                "Using OllamaClient at {} with model: {}",
                settings.host, settings.model
            );
            Ok(Box::new(OllamaClient::new(settings)?))
        }
        None => {
            debug!("Using NoopClient (no model calls).");
            Ok(Box::new(NoopClient))
        }
    }
}
