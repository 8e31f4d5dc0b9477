use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::GenerationRequest;
use crate::providers::http_errors::{model_api_request_error, model_api_status_error};

/// Ollama has no API key; a 401/403 comes from whatever sits in front of it.
const CREDENTIAL_HINT: &str = "Check the proxy or access rules in front of MODEL_BASE_URL.";

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<ChatMessage>,
    /// Ollama constrains the reply to this JSON schema.
    format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: String,
}

fn chat_url(base_url: &str) -> String {
    format!("{}/api/chat", base_url.trim_end_matches('/'))
}

fn to_ollama_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !request.system_instruction.trim().is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: request.system_instruction.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.prompt.clone(),
    });
    messages
}

pub async fn generate(
    client: &Client,
    cfg: &Config,
    request: &GenerationRequest,
) -> Result<Option<String>> {
    let api_url = chat_url(&cfg.model_base_url);
    let body = OllamaChatRequest {
        model: cfg.model.clone(),
        stream: false,
        messages: to_ollama_messages(request),
        format: request.response_schema.clone(),
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = body.messages.len(),
        "sending ollama chat request"
    );

    let response = client
        .post(&api_url)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "ollama request failed"
            );
            model_api_request_error(err, &api_url, cfg.model_timeout_secs)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "ollama returned non-success status"
        );
        return Err(model_api_status_error(
            status,
            &response_body,
            &api_url,
            CREDENTIAL_HINT,
        ));
    }

    let parsed: OllamaChatResponse = response
        .json()
        .await
        .context("Failed to parse model chat response")?;
    let text = parsed
        .message
        .map(|message| message.content)
        .filter(|content| !content.is_empty());
    debug!(
        model = %cfg.model,
        response_len = text.as_ref().map_or(0, String::len),
        "received ollama chat response"
    );
    Ok(text)
}
