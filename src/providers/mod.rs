/*!
 * Provider implementations for remote translation services.
 *
 * This module contains client implementations for translation backends:
 * - Gemini: Google Generative Language API
 * - Mock: offline pseudo-translation for dry runs and tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Provider-independent description of one translation call
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Target language code as given by the user
    pub target_language: String,
    /// Human readable target language, e.g. "French"
    pub target_language_name: String,
    /// Model identifier
    pub model: String,
    /// Short description of where the text comes from
    pub context: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl TranslationRequest {
    /// Render the translation prompt
    pub fn prompt(&self) -> String {
        let language = if self.target_language_name.eq_ignore_ascii_case(&self.target_language) {
            self.target_language.clone()
        } else {
            format!("{} ({})", self.target_language_name, self.target_language)
        };

        format!(
            "You are a professional translator. Translate the following text to {language}.\n\
             \n\
             Context: {context}\n\
             \n\
             Text to translate: \"{text}\"\n\
             \n\
             Instructions:\n\
             1. Maintain the original meaning and tone\n\
             2. Preserve any formatting markers, line breaks or special characters\n\
             3. Keep the translation natural and fluent\n\
             4. If the text contains placeholders or variables, keep them unchanged\n\
             5. Return only the translated text, nothing else\n\
             \n\
             Translated text:",
            language = language,
            context = self.context,
            text = self.text,
        )
    }
}

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Build a provider request from a translation request
    fn build_request(&self, request: &TranslationRequest) -> Self::Request;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

pub mod gemini;
pub mod mock;
