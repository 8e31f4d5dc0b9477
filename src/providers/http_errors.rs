use anyhow::anyhow;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

/// Coarse classification of a failed outbound request, shared by the model
/// providers (which turn it into an error) and the image lookup (which only
/// logs it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportFailure {
    Timeout,
    ConnectionRefused,
    Connect,
    Other,
}

impl TransportFailure {
    pub(crate) fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() || error_chain_matches(err, ErrorKind::TimedOut, "timed out") {
            return Self::Timeout;
        }
        if err.is_connect() {
            if error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused") {
                return Self::ConnectionRefused;
            }
            return Self::Connect;
        }
        Self::Other
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection_refused",
            Self::Connect => "connect",
            Self::Other => "other",
        }
    }
}

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    match TransportFailure::classify(&err) {
        TransportFailure::Timeout => anyhow!(
            "Model request timed out after {}s while calling '{}'. \
             Increase MODEL_TIMEOUT_SECS or check model responsiveness.",
            timeout_secs,
            api_url
        ),
        TransportFailure::ConnectionRefused => anyhow!(
            "Connection refused by model API at '{}'. \
             Ensure the model provider is reachable and MODEL_BASE_URL is correct.",
            api_url
        ),
        TransportFailure::Connect => anyhow!(
            "Failed to connect to model API at '{}'. \
             Check MODEL_BASE_URL and network connectivity.",
            api_url
        ),
        TransportFailure::Other => anyhow!("Failed to call model API at '{}': {}", api_url, err),
    }
}

/// `credential_hint` is the provider's advice for 401/403 responses.
pub(crate) fn model_api_status_error(
    status: StatusCode,
    response_body: &str,
    api_url: &str,
    credential_hint: &str,
) -> anyhow::Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => anyhow!(
            "Model API at '{}' rejected the credentials (status {}). {}",
            api_url,
            status,
            credential_hint
        ),
        StatusCode::TOO_MANY_REQUESTS => anyhow!(
            "Model API at '{}' is rate limiting requests (status {}). Try again later.",
            api_url,
            status
        ),
        _ => anyhow!(
            "Model request failed with status {}: {}",
            status,
            response_body
        ),
    }
}
