//! LLM provider abstraction and implementations.
//!
//! Both orchestrators depend only on the [`LlmProvider`] trait, which
//! bundles the two capabilities the pipeline needs: text embedding and
//! answer generation. Provider selection happens once, in
//! [`create_provider`], from a single configuration value.
//!
//! Two backends are implemented:
//! - **[`GeminiProvider`]** — Google Generative Language API
//!   (`embedding-001` for vectors, `gemini-2.5-flash` for answers).
//! - **[`OpenAiProvider`]** — OpenAI API (`text-embedding-3-small`,
//!   `gpt-4o`).
//!
//! Calls are single blocking round-trips with a configured timeout and
//! no automatic retry; retry is a caller action.

use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::error::ProviderError;

const GEMINI_EMBED_MODEL: &str = "embedding-001";
const GEMINI_GENERATE_MODEL: &str = "gemini-2.5-flash";
const OPENAI_EMBED_MODEL: &str = "text-embedding-3-small";
const OPENAI_GENERATE_MODEL: &str = "gpt-4o";

/// Which concrete provider backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GEMINI" => Ok(ProviderKind::Gemini),
            "OPENAI" => Ok(ProviderKind::OpenAi),
            other => anyhow::bail!("unknown provider '{}'; expected GEMINI or OPENAI", other),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "GEMINI"),
            ProviderKind::OpenAi => write!(f, "OPENAI"),
        }
    }
}

/// Embedding and generation capabilities behind one interface.
///
/// Retrieval quality depends on answering with the same provider family
/// that indexed the documents; the trait does not enforce that pairing.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;

    /// Embed one text unit into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Generate an answer for a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Cheap credential check: one authenticated round-trip against the
    /// provider's model listing, without spending embedding or generation
    /// quota.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Instantiate the provider selected by the configuration.
///
/// Fails up front when the selected provider's API key is absent, so a
/// misconfigured process dies at startup rather than mid-pipeline.
pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>, ProviderError> {
    match config.provider {
        ProviderKind::Gemini => {
            let key = config
                .google_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("GOOGLE_API_KEY"))?;
            Ok(Box::new(GeminiProvider::new(key, config.timeout_secs)?))
        }
        ProviderKind::OpenAi => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("OPENAI_API_KEY"))?;
            Ok(Box::new(OpenAiProvider::new(key, config.timeout_secs)?))
        }
    }
}

/// Reject non-success responses, preserving status and body detail.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        body,
    })
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

// ============ Gemini ============

/// Provider backed by the Google Generative Language REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedding,
}

#[derive(Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "GEMINI"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!(
            "{}/models/{}:embedContent",
            self.base_url, GEMINI_EMBED_MODEL
        );
        let body = serde_json::json!({
            "model": format!("models/{}", GEMINI_EMBED_MODEL),
            "content": { "parts": [{ "text": text }] },
            "taskType": "RETRIEVAL_DOCUMENT",
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: GeminiEmbedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        if parsed.embedding.values.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "empty embedding values".to_string(),
            ));
        }
        Ok(parsed.embedding.values)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, GEMINI_GENERATE_MODEL
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: GeminiGenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        if text.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "candidate has no text parts".to_string(),
            ));
        }
        Ok(text)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

// ============ OpenAI ============

/// Provider backed by the OpenAI API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OPENAI"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": OPENAI_EMBED_MODEL,
            "input": text,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| ProviderError::MalformedResponse("empty data array".to_string()))
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": OPENAI_GENERATE_MODEL,
            "messages": [
                { "role": "system", "content": "You are a helpful assistant." },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices".to_string()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
