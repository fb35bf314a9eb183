/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - Anthropic: Anthropic Messages API
 * - Ollama: Local LLM server
 * - Mock: scripted behaviours for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One gateway call: ordered texts in, ordered translations out
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Texts to translate, in batch order
    pub texts: Vec<String>,

    /// Target language name, e.g. "English"
    pub target_language: String,

    /// Terms that must come back unchanged
    pub preserve_terms: Vec<String>,
}

impl TranslationRequest {
    /// Create a request without preserve terms
    pub fn new(texts: Vec<String>, target_language: impl Into<String>) -> Self {
        Self {
            texts,
            target_language: target_language.into(),
            preserve_terms: Vec::new(),
        }
    }

    /// Attach the terms to preserve
    pub fn with_preserve_terms(mut self, terms: Vec<String>) -> Self {
        self.preserve_terms = terms;
        self
    }
}

/// Common trait for all translation providers
///
/// An implementation returns one string per submitted text, in the same
/// order. It does not retry and does not check the count; both are the
/// gateway's job.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate every text of the request
    ///
    /// # Arguments
    /// * `request` - The texts and the target language
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - Translations in request order or an error
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError>;

    /// Short provider name used in log lines
    fn name(&self) -> &str;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
