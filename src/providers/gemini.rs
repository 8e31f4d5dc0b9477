use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::GenerationRequest;
use crate::providers::http_errors::{model_api_request_error, model_api_status_error};

const JSON_MIME_TYPE: &str = "application/json";
const CREDENTIAL_HINT: &str = "Check GEMINI_API_KEY.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when there is none.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

fn generate_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Gemini expects OpenAPI-style upper-case type names.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(name)) => Value::String(name.to_ascii_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: request.system_instruction.clone(),
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME_TYPE,
            response_schema: to_gemini_schema(&request.response_schema),
        },
    }
}

pub async fn generate(
    client: &Client,
    cfg: &Config,
    request: &GenerationRequest,
) -> Result<Option<String>> {
    let api_key = cfg
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;
    let api_url = generate_url(&cfg.model_base_url, &cfg.model);
    let body = build_request(request);
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        prompt_len = request.prompt.len(),
        "sending gemini generateContent request"
    );

    let response = client
        .post(&api_url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "gemini request failed"
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
            "gemini returned non-success status"
        );
        return Err(model_api_status_error(
            status,
            &response_body,
            &api_url,
            CREDENTIAL_HINT,
        ));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .context("Failed to parse gemini generateContent response")?;
    let text = parsed.text();
    debug!(
        model = %cfg.model,
        candidate_count = parsed.candidates.len(),
        finish_reason = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .unwrap_or("none"),
        response_len = text.as_ref().map_or(0, String::len),
        "received gemini response"
    );
    Ok(text)
}
