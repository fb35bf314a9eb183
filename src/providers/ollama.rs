use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest};
use crate::translation::prompts::{parse_response, PromptTemplate, TranslationPromptBuilder};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// System prompt template
    prompt: PromptTemplate,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    pub done: bool,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1 only
                .http1_only()
                .build()
                .unwrap_or_default(),
            model: model.into(),
            temperature: 0.3,
            prompt: PromptTemplate::default(),
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the system prompt; a blank template keeps the default
    pub fn with_system_prompt(mut self, template: &str) -> Self {
        self.prompt = PromptTemplate::or_default(template);
        self
    }

    /// Send a chat request
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ProviderError::ConnectionError(format!("Failed to reach Ollama at {}: {}", self.base_url, e))
            } else {
                ProviderError::RequestFailed(format!("Failed to send request to Ollama API: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Ollama API response: {}", e)))?;

        parse_chat_response(&response_text)
    }
}

/// Parse a chat answer, accepting a streamed (JSON lines) body as well
fn parse_chat_response(body: &str) -> Result<ChatResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<ChatResponse>(body) {
        return Ok(response);
    }

    let chunks: Vec<ChatResponse> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<ChatResponse>(line).ok())
        .collect();
    let Some(last) = chunks.last() else {
        return Err(ProviderError::ParseError(
            "Ollama API response contains no valid JSON".to_string(),
        ));
    };

    let content: String = chunks.iter().map(|chunk| chunk.message.content.as_str()).collect();
    Ok(ChatResponse {
        model: last.model.clone(),
        message: ChatMessage {
            role: last.message.role.clone(),
            content,
        },
        done: true,
    })
}

#[async_trait]
impl Provider for Ollama {
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError> {
        if request.texts.is_empty() {
            return Ok(Vec::new());
        }

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.prompt.render(&request.target_language),
            },
            ChatMessage {
                role: "user".to_string(),
                content: TranslationPromptBuilder::new(request).build(),
            },
        ];

        let response = self
            .chat(ChatRequest::new(&self.model, messages).temperature(self.temperature))
            .await?;
        parse_response(&response.message.content, &request.texts)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
