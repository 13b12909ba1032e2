// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Chat completion over an OpenAI-compatible endpoint.
//!
//! [`ChatClient`] posts a message list to `POST {base}/v1/chat/completions`
//! with `stream: false` and extracts the first choice's message content.
//! The pipeline sends exactly one system message and one user turn per
//! submission; no history is retained between submissions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::services::{AIService, LLMService};

/// Service tag used in error variants and logs.
const SERVICE: &str = "chat";

// ---------------------------------------------------------------------------
// Message and request/response types
// ---------------------------------------------------------------------------

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions establishing the assistant persona.
    System,
    /// The human turn.
    User,
    /// A model reply.
    Assistant,
}

/// One (role, content) pair in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

/// Non-streaming completions response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Chat-completion client for OpenAI-compatible endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use talktalk::services::chat::ChatClient;
///
/// let llm = ChatClient::new("http://localhost:10086")
///     .with_model("llama")
///     .with_context_window(2048);
/// ```
pub struct ChatClient {
    /// Base URL of the API server (without trailing slash).
    base_url: String,
    /// Model identifier.
    model: String,
    /// Optional decoding context window, forwarded verbatim.
    context_window: Option<u32>,
    /// Optional sampling temperature.
    temperature: Option<f64>,
    /// Optional completion length cap.
    max_tokens: Option<u64>,
    /// Optional bearer key; local servers usually need none.
    api_key: Option<String>,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl ChatClient {
    /// Default model used when none is specified.
    pub const DEFAULT_MODEL: &'static str = "llama";

    /// Create a new `ChatClient` against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            context_window: None,
            temperature: None,
            max_tokens: None,
            api_key: None,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method: set the decoding context window.
    pub fn with_context_window(mut self, context_window: u32) -> Self {
        self.context_window = Some(context_window);
        self
    }

    /// Builder method: set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builder method: set the completion length cap.
    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Builder method: set a bearer API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder method: set a custom `reqwest::Client`.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the full API URL for the completions endpoint.
    fn api_url(&self) -> String {
        let host = self.base_url.trim_end_matches('/');
        format!("{}/v1/chat/completions", host)
    }

    /// Build the request body for one inference.
    fn build_request(&self, messages: &[ChatMessage]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            context_window: self.context_window,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// POST one completion request and extract the assistant reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.api_url();
        let body = self.build_request(messages);

        debug!(url = %url, model = %self.model, turns = messages.len(), "sending chat request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "chat HTTP request failed");
            Error::Http {
                service: SERVICE,
                source: e,
            }
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| Error::Http {
            service: SERVICE,
            source: e,
        })?;

        if !status.is_success() {
            error!(status = %status, body = %response_text, "chat API error");
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: response_text,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| Error::MalformedResponse {
                service: SERVICE,
                detail: format!("{e}: {response_text}"),
            })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| Error::MalformedResponse {
                service: SERVICE,
                detail: "missing choices[0].message.content".to_string(),
            })?;

        debug!(reply_len = reply.len(), "chat completion received");
        Ok(reply)
    }
}

impl AIService for ChatClient {
    fn name(&self) -> &'static str {
        "ChatClient"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }
}

#[async_trait]
impl LLMService for ChatClient {
    async fn run_inference(&self, messages: &[ChatMessage]) -> Result<String> {
        self.complete(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Construction and builder tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_client_defaults() {
        let client = ChatClient::new("http://localhost:10086");
        assert_eq!(client.model, "llama");
        assert!(client.context_window.is_none());
        assert!(client.temperature.is_none());
        assert!(client.max_tokens.is_none());
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let client = ChatClient::new("http://example.com")
            .with_model("qwen2-7b-instruct")
            .with_context_window(2048)
            .with_temperature(0.7)
            .with_max_tokens(512)
            .with_api_key("sk-test");
        assert_eq!(client.model, "qwen2-7b-instruct");
        assert_eq!(client.context_window, Some(2048));
        assert_eq!(client.temperature, Some(0.7));
        assert_eq!(client.max_tokens, Some(512));
        assert_eq!(client.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let client = ChatClient::new("http://localhost:10086/");
        assert_eq!(client.api_url(), "http://localhost:10086/v1/chat/completions");
    }

    #[test]
    fn test_ai_service_model() {
        let client = ChatClient::new("http://localhost:10086").with_model("llama");
        assert_eq!(AIService::model(&client), Some("llama"));
    }

    // -----------------------------------------------------------------------
    // Message construction tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, MessageRole::System);
        assert_eq!(ChatMessage::user("b").role, MessageRole::User);
        assert_eq!(ChatMessage::assistant("c").role, MessageRole::Assistant);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&MessageRole::System).unwrap(),
            "\"system\""
        );
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    // -----------------------------------------------------------------------
    // Request building tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_request_serialization() {
        let client = ChatClient::new("http://localhost:10086").with_model("llama");
        let messages = vec![
            ChatMessage::system("You are a helpful AI assistant."),
            ChatMessage::user("Hello"),
        ];
        let json = serde_json::to_string(&client.build_request(&messages)).unwrap();

        assert!(json.contains("\"model\":\"llama\""));
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"Hello\""));
        assert!(!json.contains("context_window"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_request_serialization_with_context_window() {
        let client = ChatClient::new("http://localhost:10086").with_context_window(200);
        let json =
            serde_json::to_string(&client.build_request(&[ChatMessage::user("hi")])).unwrap();
        assert!(json.contains("\"context_window\":200"));
    }

    #[test]
    fn test_request_preserves_message_order() {
        let client = ChatClient::new("http://localhost:10086");
        let request = client.build_request(&[
            ChatMessage::system("persona"),
            ChatMessage::user("question"),
        ]);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[1].role, MessageRole::User);
    }

    // -----------------------------------------------------------------------
    // Response parsing tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_response_extracts_first_choice() {
        let json = r#"{"choices":[{"message":{"content":"Hi there"}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        assert_eq!(content.as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_response_empty_choices() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn test_response_missing_choices_defaults_empty() {
        let resp: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }

    // -----------------------------------------------------------------------
    // Error path tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_run_inference_connection_error() {
        // Unreachable endpoint so the HTTP request fails fast.
        let client = ChatClient::new("http://localhost:1");
        let err = client
            .run_inference(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { service: "chat", .. }));
    }
}
