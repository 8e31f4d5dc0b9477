use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::config::Config;
use crate::model::{self, GenerationRequest};
use crate::providers::wikimedia;

pub type GenerationFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<String>>> + 'a>>;

/// Schema-constrained text generation. `Ok(None)` means the model answered
/// without any text.
pub trait ContentGenerator {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a>;
}

/// Image lookups cannot fail: implementations absorb their own errors.
pub type ImageFuture<'a> = Pin<Box<dyn Future<Output = Option<String>> + 'a>>;

pub trait ImageSearch {
    fn find_image<'a>(&'a self, subject: &'a str, topic: &'a str) -> ImageFuture<'a>;
}

pub struct HostContentGenerator<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostContentGenerator<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ContentGenerator for HostContentGenerator<'_> {
    fn generate<'b>(&'b self, request: &'b GenerationRequest) -> GenerationFuture<'b> {
        Box::pin(async move { model::generate(self.client, self.cfg, request).await })
    }
}

pub struct HostImageSearch<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostImageSearch<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ImageSearch for HostImageSearch<'_> {
    fn find_image<'b>(&'b self, subject: &'b str, topic: &'b str) -> ImageFuture<'b> {
        Box::pin(async move {
            if !self.cfg.image_search {
                debug!("image search disabled; skipping lookup");
                return None;
            }
            wikimedia::find_image(self.client, self.cfg, subject, topic).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentGenerator, HostContentGenerator, HostImageSearch, ImageSearch};
    use crate::config::test_config;
    use crate::model::GenerationRequest;

    #[tokio::test]
    async fn host_image_search_skips_lookup_when_disabled() {
        let client = reqwest::Client::new();
        let mut cfg = test_config();
        cfg.image_search = false;
        // Never contacted while the lookup is disabled.
        cfg.image_search_url = "http://127.0.0.1:9/w/api.php".to_string();

        let search = HostImageSearch::new(&client, &cfg);
        assert_eq!(search.find_image("Physics", "Inertia").await, None);
    }

    #[tokio::test]
    async fn host_generator_surfaces_provider_errors() {
        let client = reqwest::Client::new();
        let mut cfg = test_config();
        cfg.model_provider = "unknown".to_string();

        let generator = HostContentGenerator::new(&client, &cfg);
        let request = GenerationRequest {
            system_instruction: "sys".to_string(),
            prompt: "prompt".to_string(),
            response_schema: serde_json::json!({"type": "object"}),
        };
        let err = generator
            .generate(&request)
            .await
            .expect_err("unknown provider should fail");
        let msg = format!("{err:#}");
        assert!(msg.contains("Unsupported MODEL_PROVIDER"), "unexpected message: {msg}");
    }
}
