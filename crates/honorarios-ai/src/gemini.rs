//! Gemini `generateContent` REST client.

use std::time::Duration;

use async_trait::async_trait;
use honorarios_core::Settings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::generator::{RETRY_BACKOFF, TextGenerator, with_retry};

// ── Wire types ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// ── Client ──

/// Client for one Gemini model.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u8,
}

impl GeminiClient {
    /// Create a client with a per-request `timeout`.
    ///
    /// `base_url` should be like `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
        max_retries: u8,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::from_reqwest)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            max_retries,
        })
    }

    /// Build from settings. Fails with a configuration error when the API
    /// credential is missing.
    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        settings.validate()?;
        let api_key = settings.require_api_key()?.to_string();
        Self::new(
            api_key,
            settings.model.clone(),
            settings.base_url.clone(),
            settings.timeout,
            settings.max_retries,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_once(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        let url = self.endpoint();
        let body = build_request(prompt, temperature);

        debug!(url = %url, prompt_chars = prompt.len(), "calling Gemini");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(GenerationError::from_reqwest)?;
        let text = extract_text(&bytes)?;
        info!(model = %self.model, chars = text.len(), "received model reply");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        with_retry(self.max_retries, RETRY_BACKOFF, || {
            self.generate_once(prompt, temperature)
        })
        .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn build_request(prompt: &str, temperature: f32) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &[u8]) -> Result<String, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_slice(body)?;
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyResponse {
            finish_reason: None,
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse {
            finish_reason: candidate.finish_reason,
        });
    }
    Ok(text)
}
