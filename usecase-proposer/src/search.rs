//! Serper web search client
//!
//! Grounds the research stage with fresh snippets about the company. The
//! pipeline depends only on the [`SearchProvider`] trait.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// Number of organic results fed into the research prompt
const MAX_HITS: usize = 5;

/// One organic search result
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Web search capability used by the research stage
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// HTTP client for the Serper API
pub struct SerperClient {
    http: reqwest::Client,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .http
            .post(SERPER_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .context("Serper request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Serper returned {}: {}", status, body));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to decode Serper response")?;

        Ok(parsed.organic.into_iter().take(MAX_HITS).collect())
    }
}

/// Render hits as a markdown block for prompt context
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("- {} ({})\n  {}", h.title, h.link, h.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}
