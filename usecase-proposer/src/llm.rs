//! Gemini text generation client
//!
//! Thin `generateContent` wrapper. The rest of the app talks to the
//! [`TextModel`] trait so tests can substitute a scripted model.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model identity used by the pipeline
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One-shot text generation
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    system_instruction: RequestContent,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// HTTP client for the Gemini API
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_ENDPOINT, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: RequestContent {
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini returned {}: {}", status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response")?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned an empty completion"));
        }

        Ok(text)
    }
}
