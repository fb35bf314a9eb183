/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::echo()` - Returns every text unchanged
 * - `MockProvider::prefix(p)` - Returns `p + text` for every text
 * - `MockProvider::dictionary(..)` - Looks texts up, echoing unknown ones
 * - `MockProvider::failing()` - Always fails with a transport error
 *
 * Every request is recorded so tests can inspect what was submitted.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns the texts unchanged
    Echo,
    /// Prepends a fixed string to every text
    Prefix(String),
    /// Looks every text up, echoing texts without an entry
    Dictionary(HashMap<String, String>),
    /// Echoes the texts but leaves out the last one
    DropLast,
    /// Fails with a connection error for the first `times` requests, then echoes
    FailTransient { times: usize },
    /// Always fails with a connection error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of requests received
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Mutex<Vec<TranslationRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider that returns texts unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock provider that prefixes every text
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::Prefix(prefix.into()))
    }

    /// Create a mock provider backed by a fixed dictionary
    pub fn dictionary<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(MockBehavior::Dictionary(map))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Every text submitted so far, flattened in submission order
    pub fn submitted_texts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .flat_map(|request| request.texts)
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let texts = &request.texts;
        match &self.behavior {
            MockBehavior::Echo => Ok(texts.clone()),
            MockBehavior::Prefix(prefix) => Ok(texts.iter().map(|t| format!("{}{}", prefix, t)).collect()),
            MockBehavior::Dictionary(map) => Ok(texts
                .iter()
                .map(|t| map.get(t).cloned().unwrap_or_else(|| t.clone()))
                .collect()),
            MockBehavior::DropLast => {
                let mut translations = texts.clone();
                translations.pop();
                Ok(translations)
            }
            MockBehavior::FailTransient { times } if count <= *times => Err(ProviderError::ConnectionError(
                format!("simulated connection reset on request {}", count),
            )),
            MockBehavior::FailTransient { .. } => Ok(texts.clone()),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "simulated connection failure".to_string(),
            )),
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "simulated invalid API key".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
