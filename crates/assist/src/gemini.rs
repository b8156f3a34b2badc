//! REST client for the Generative Language `generateContent` endpoint.
//!
//! Requests structured JSON output with a fixed response schema, then reads
//! the suggestion out of the first candidate's first text part.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{AssistError, ContentAssist, MarketingSuggestion};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; blank disables the client.
    pub api_key: String,
    pub model: String,
    /// Base HTTP URL, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// HTTP client for content suggestions.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

// ---- response shape (only the parts read) ----

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AssistError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AssistError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Build the request body for `product_info`.
pub fn build_request(product_info: &str) -> serde_json::Value {
    let instruction = format!(
        "Berikan konten pemasaran kreatif untuk produk berikut dalam Bahasa Indonesia: {product_info}.\n\
         Berikan output dalam format JSON dengan field: tagline (pendek, catchy), caption (untuk media sosial), \
         prompt (deskripsi visual untuk generator gambar), dan harga_saran (estimasi harga jika tidak disebutkan)."
    );

    json!({
        "contents": [{ "parts": [{ "text": instruction }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "tagline": { "type": "STRING" },
                    "caption": { "type": "STRING" },
                    "prompt": { "type": "STRING" },
                    "harga_saran": { "type": "STRING" }
                },
                "required": ["tagline", "caption", "prompt", "harga_saran"]
            }
        }
    })
}

/// Extract the suggestion from a decoded response.
pub fn parse_generate_response(
    response: &GenerateContentResponse,
) -> Result<MarketingSuggestion, AssistError> {
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .ok_or(AssistError::MissingContent)?;

    Ok(MarketingSuggestion::from_json_text(text)?)
}

#[async_trait]
impl ContentAssist for GeminiClient {
    async fn generate(&self, product_info: &str) -> Result<MarketingSuggestion, AssistError> {
        let product_info = product_info.trim();
        if product_info.is_empty() {
            return Err(AssistError::EmptyDescription);
        }
        if !self.is_configured() {
            return Err(AssistError::NotConfigured);
        }

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&build_request(product_info))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let decoded: GenerateContentResponse = response.json().await?;

        let suggestion = parse_generate_response(&decoded).inspect_err(|e| {
            tracing::error!(error = %e, model = %self.config.model, "Content generation failed");
        })?;
        tracing::debug!(model = %self.config.model, "Content suggestion received");
        Ok(suggestion)
    }
}
