use anyhow::{Result, anyhow, bail};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers;

const SUPPORTED_PROVIDERS: &str = "gemini, ollama";

/// A single schema-constrained generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub response_schema: Value,
}

/// Checks the provider selection and its credentials before any request is made.
pub fn ensure_ready(cfg: &Config) -> Result<()> {
    match cfg.model_provider.as_str() {
        "gemini" => {
            if cfg.api_key.is_none() {
                bail!(
                    "No API key configured for MODEL_PROVIDER='gemini'. \
                     Set GEMINI_API_KEY (or API_KEY)."
                );
            }
            Ok(())
        }
        "ollama" => Ok(()),
        other => Err(unsupported_provider(other)),
    }
}

/// Returns the model's text payload, or `None` when the model produced no text.
pub async fn generate(
    client: &Client,
    cfg: &Config,
    request: &GenerationRequest,
) -> Result<Option<String>> {
    let provider = cfg.model_provider.to_ascii_lowercase();

    match provider.as_str() {
        "gemini" => {
            debug!(
                provider = "gemini",
                model = %cfg.model,
                prompt_len = request.prompt.len(),
                "dispatching generation request"
            );
            providers::gemini::generate(client, cfg, request).await
        }
        "ollama" => {
            debug!(
                provider = "ollama",
                model = %cfg.model,
                prompt_len = request.prompt.len(),
                "dispatching generation request"
            );
            providers::ollama::generate(client, cfg, request).await
        }
        other => {
            warn!(provider = %other, "unsupported model provider configured");
            Err(unsupported_provider(other))
        }
    }
}

fn unsupported_provider(provider: &str) -> anyhow::Error {
    anyhow!(
        "Unsupported MODEL_PROVIDER='{}'. Supported providers: {}.",
        provider,
        SUPPORTED_PROVIDERS
    )
}
