/*!
 * Translation client adapter.
 *
 * Wraps a provider behind the `Translator` trait: one text in, one
 * translation or one classified `TranslationError` out. Every call is
 * bounded by the adapter timeout.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::gemini::{self, Gemini};
use crate::providers::mock::MockProvider;
use crate::providers::{Provider, TranslationRequest};

/// Default bound on a single translation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Context line sent with every prompt
pub const DEFAULT_CONTEXT: &str = "PowerPoint presentation content";

/// A service that translates one text at a time
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

/// Provider-backed translator
#[derive(Debug)]
pub struct TranslationClient<P: Provider> {
    provider: P,
    model: String,
    timeout: Duration,
    context: String,
    temperature: Option<f32>,
}

impl<P: Provider> TranslationClient<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            context: DEFAULT_CONTEXT.to_string(),
            temperature: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn request_for(&self, text: &str, target_language: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            target_language: target_language.to_string(),
            target_language_name: language_utils::display_name(target_language),
            model: self.model.clone(),
            context: self.context.clone(),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl<P> Translator for TranslationClient<P>
where
    P: Provider,
    P::Request: 'static,
    P::Response: 'static,
{
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let request = self.provider.build_request(&self.request_for(text, target_language));

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| TranslationError::Timeout(self.timeout))??;

        let translated = clean_response(&P::extract_text(&response), text);
        if translated.is_empty() {
            return Err(TranslationError::Permanent("Provider returned an empty translation".to_string()));
        }

        debug!("Translated {} chars into {} chars", text.chars().count(), translated.chars().count());
        Ok(translated)
    }
}

/// Trim a model response and drop one pair of double quotes the model wrapped around it.
///
/// The pair is only removed when it encloses the whole response, so a translation that
/// starts and ends with separate quoted phrases is kept as is.
pub fn clean_response(response: &str, source_text: &str) -> String {
    let trimmed = response.trim();
    let source = source_text.trim();

    for (open, close) in [('"', '"'), ('\u{201C}', '\u{201D}')] {
        let source_quoted = source.starts_with(open) && source.ends_with(close);
        if source_quoted || trimmed.chars().count() < 2 || !trimmed.starts_with(open) || !trimmed.ends_with(close) {
            continue;
        }

        let inner = &trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()];
        if inner.contains(open) || inner.contains(close) {
            continue;
        }
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

/// Build the translator selected by the configuration
pub fn build_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let translator: Arc<dyn Translator> = match config.provider {
        TranslationProvider::Gemini => {
            let api_key = config
                .resolved_api_key()
                .ok_or_else(|| anyhow!("Gemini API key is required (config, --api-key or GEMINI_API_KEY)"))?;

            if !gemini::is_known_model(&config.model) {
                let known: Vec<&str> = gemini::KNOWN_MODELS.iter().map(|(name, _)| *name).collect();
                warn!("Model '{}' is not a known Gemini model. Known models: {}", config.model, known.join(", "));
            }

            Arc::new(
                TranslationClient::new(Gemini::new(api_key, config.endpoint.clone(), timeout), config.model.clone())
                    .with_timeout(timeout)
                    .with_context(config.context.clone())
                    .with_temperature(config.temperature),
            )
        }
        TranslationProvider::Mock => Arc::new(
            TranslationClient::new(MockProvider::working(), config.model.clone())
                .with_timeout(timeout)
                .with_context(config.context.clone()),
        ),
    };

    Ok(translator)
}
