use std::env;

const DEFAULT_MODEL_PROVIDER: &str = "gemini";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:3b";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful and precise educational assistant. Always respond with valid JSON.";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STUDY_LEVEL: &str = "Grade 12";
const DEFAULT_IMAGE_SEARCH: bool = true;
const DEFAULT_IMAGE_SEARCH_URL: &str = "https://commons.wikimedia.org/w/api.php";

#[derive(Debug, Clone)]
pub struct Config {
    pub model_provider: String,
    pub model: String,
    pub model_base_url: String,
    pub api_key: Option<String>,
    pub system_prompt: String,
    pub model_timeout_secs: u64,
    pub study_level: String,
    pub image_search: bool,
    pub image_search_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let model_provider = get_var("MODEL_PROVIDER")
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_PROVIDER.to_string());
        let model_base_url = non_blank(get_var("MODEL_BASE_URL"))
            .unwrap_or_else(|| default_base_url(&model_provider).to_string());
        let api_key = non_blank(get_var("GEMINI_API_KEY")).or_else(|| non_blank(get_var("API_KEY")));
        let model_timeout_secs = parse_model_timeout_secs(get_var("MODEL_TIMEOUT_SECS").as_deref());
        let image_search = parse_bool(get_var("IMAGE_SEARCH").as_deref(), DEFAULT_IMAGE_SEARCH);

        Self {
            model: non_blank(get_var("MODEL"))
                .unwrap_or_else(|| default_model(&model_provider).to_string()),
            model_provider,
            model_base_url,
            api_key,
            system_prompt: get_var("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model_timeout_secs,
            study_level: non_blank(get_var("STUDY_LEVEL"))
                .unwrap_or_else(|| DEFAULT_STUDY_LEVEL.to_string()),
            image_search,
            image_search_url: non_blank(get_var("IMAGE_SEARCH_URL"))
                .unwrap_or_else(|| DEFAULT_IMAGE_SEARCH_URL.to_string()),
        }
    }
}

fn default_model(provider: &str) -> &'static str {
    match provider {
        "ollama" => DEFAULT_OLLAMA_MODEL,
        _ => DEFAULT_GEMINI_MODEL,
    }
}

fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "ollama" => DEFAULT_OLLAMA_BASE_URL,
        _ => DEFAULT_GEMINI_BASE_URL,
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_MODEL_TIMEOUT_SECS)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_env_with(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
}
