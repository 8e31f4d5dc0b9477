//! Illustration lookup against the Wikimedia Commons search API.
//!
//! Every failure here is logged and swallowed: callers only ever see an
//! optional URL.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers::http_errors::TransportFailure;

/// Commons namespace holding media files.
const FILE_NAMESPACE: &str = "6";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pages: HashMap<String, SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    /// Rank of the page within the search results.
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(default)]
    url: Option<String>,
}

impl SearchResponse {
    fn first_image_url(self) -> Option<String> {
        let mut pages: Vec<SearchPage> = self.query?.pages.into_values().collect();
        pages.sort_by_key(|page| page.index.unwrap_or(u32::MAX));
        pages
            .into_iter()
            .next()?
            .imageinfo
            .into_iter()
            .next()?
            .url
            .filter(|url| !url.trim().is_empty())
    }
}

pub(crate) fn search_terms(subject: &str, topic: &str) -> String {
    format!("{} {} diagram", subject, topic)
}

pub async fn find_image(
    client: &Client,
    cfg: &Config,
    subject: &str,
    topic: &str,
) -> Option<String> {
    match lookup(client, cfg, subject, topic).await {
        Ok(Some(url)) => {
            debug!(subject = %subject, topic = %topic, image_url = %url, "found illustration");
            Some(url)
        }
        Ok(None) => {
            debug!(subject = %subject, topic = %topic, "no illustration found");
            None
        }
        Err(err) => {
            warn!(
                subject = %subject,
                topic = %topic,
                error = %format!("{err:#}"),
                "image lookup failed; continuing without an image"
            );
            None
        }
    }
}

async fn lookup(
    client: &Client,
    cfg: &Config,
    subject: &str,
    topic: &str,
) -> Result<Option<String>> {
    let terms = search_terms(subject, topic);
    let response = client
        .get(&cfg.image_search_url)
        .query(&[
            ("action", "query"),
            ("generator", "search"),
            ("gsrnamespace", FILE_NAMESPACE),
            ("gsrsearch", terms.as_str()),
            ("gsrlimit", "1"),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
            ("format", "json"),
            ("origin", "*"),
        ])
        .send()
        .await
        .map_err(|err| {
            anyhow!(
                "image search request to '{}' failed ({}): {}",
                cfg.image_search_url,
                TransportFailure::classify(&err).as_str(),
                err
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("image search returned status {}", status));
    }

    let parsed: SearchResponse = response
        .json()
        .await
        .context("Failed to parse image search response")?;
    Ok(parsed.first_image_url())
}
