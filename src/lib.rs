pub mod config;
pub mod content;
pub mod fetcher;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod providers;
pub mod repl;
pub mod session;
pub mod subjects;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::info;

use config::Config;
use fetcher::ExplanationFetcher;
use repl::{render_study_content, run_repl};
use session::{GENERIC_ERROR_MESSAGE, StudySession};

const USAGE: &str = "usage: scholarsync [<subject> <topic...>]";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared client for the model and image requests. Commons rejects requests
/// without a User-Agent.
pub fn build_http_client(cfg: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        model_provider = %cfg.model_provider,
        model = %cfg.model,
        model_base_url = %cfg.model_base_url,
        api_key_configured = cfg.api_key.is_some(),
        study_level = %cfg.study_level,
        image_search = cfg.image_search,
        "loaded runtime configuration"
    );
    model::ensure_ready(&cfg)?;

    let client = build_http_client(&cfg)?;
    let fetcher = ExplanationFetcher::new(&client, &cfg);

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => run_repl(&fetcher, &cfg).await,
        [_] => bail!("missing topic; {USAGE}"),
        [subject, topic @ ..] => {
            let mut session = StudySession::new();
            session.select_subject(subject)?;
            session.set_topic(topic.join(" "));
            session.submit(&fetcher).await;

            let content = session
                .result()
                .ok_or_else(|| anyhow!(session.error().unwrap_or(GENERIC_ERROR_MESSAGE)))?;
            println!(
                "{}",
                render_study_content(session.topic(), content, session.settled_at()).trim_end()
            );
            Ok(())
        }
    }
}
