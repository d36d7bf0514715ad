use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A service that turns a prompt into plain text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Makes a single, non-streaming call and returns the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// --- Wire types for a `generateContent`-style endpoint ---

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate's first part.
    fn first_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .context("No candidates in text generation response")?;
        let part = candidate
            .content
            .context("First candidate has no content")?
            .parts
            .into_iter()
            .next()
            .context("First candidate has no parts")?;
        part.text.context("First part has no text")
    }
}

/// A `TextGenerator` for a Gemma/Gemini `generateContent` HTTP endpoint.
pub struct GemmaClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GemmaClient {
    /// Creates a client that POSTs to `endpoint` as given; the URL is not
    /// rewritten, so it must already name the generate operation.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the generate endpoint.
    /// * `api_key` - Sent as `x-goog-api-key` when present.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GemmaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key.as_str());
        }

        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "Calling text generation endpoint.");
        let response = request
            .send()
            .await
            .context("Text generation request failed")?
            .error_for_status()
            .context("Text generation endpoint returned an error status")?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode text generation response")?;
        parsed.first_text()
    }
}
