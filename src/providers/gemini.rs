use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{mentions_quota, ProviderError};
use crate::providers::{Provider, TranslationRequest};

/// Public Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Gemini models known to handle translation prompts
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gemini-2.5-flash", "Gemini 2.5 flash model (fastest and most efficient)"),
    ("gemini-2.5-pro", "Gemini 2.5 pro model (most capable)"),
    ("gemini-2.0-flash", "Previous stable flash model"),
    ("gemini-2.0-flash-exp", "Previous experimental flash model"),
    ("gemini-1.5-flash", "Legacy flash model"),
    ("gemini-1.5-pro", "Legacy pro model"),
];

/// Whether a model name is in the known list
pub fn is_known_model(model: &str) -> bool {
    KNOWN_MODELS.iter().any(|(name, _)| *name == model)
}

/// Gemini client for interacting with the Generative Language API
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Model name, part of the URL rather than the body
    #[serde(skip)]
    pub model: String,

    pub contents: Vec<GeminiContent>,

    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A content block (request or candidate)
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    #[serde(rename = "usageMetadata", default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,

    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u64,

    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u64,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The HTTP timeout is a backstop; the translation client enforces the
    /// per-call timeout.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout + Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, model: &str) -> Result<Url, ProviderError> {
        let base = if self.endpoint.is_empty() { DEFAULT_ENDPOINT } else { self.endpoint.as_str() };
        let raw = format!("{}/v1beta/models/{}:generateContent", base.trim_end_matches('/'), model);
        Url::parse(&raw).map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", raw, e)))
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    fn build_request(&self, request: &TranslationRequest) -> GeminiRequest {
        GeminiRequest {
            model: request.model.clone(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: request.prompt() }],
            }],
            generation_config: request.temperature.map(|temperature| GenerationConfig {
                temperature: Some(temperature),
            }),
        }
    }

    async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let api_url = self.api_url(&request.model)?;

        let response = self
            .client
            .post(api_url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(format!("Failed to reach Gemini API: {}", e))
                } else {
                    ProviderError::RequestFailed(format!("Failed to send request to Gemini API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(error_text),
                _ if mentions_quota(&error_text) => ProviderError::RateLimitExceeded(error_text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::AuthenticationError(error_text)
                }
                _ => ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    fn extract_text(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter().map(|part| part.text.as_str()).collect())
            .unwrap_or_default()
    }
}
