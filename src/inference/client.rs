//! OpenAI-compatible inference client.
//!
//! Sends non-streaming chat completion requests to an OpenAI or Azure OpenAI
//! endpoint and parses the assistant turn, including native tool calls.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;

use super::config::{ModelConfig, Provider};
use super::errors::{FailureCause, InferenceError};
use super::response::{api_error_message, parse_completion_response};
use super::types::{ChatCompletionRequest, ChatMessage, CompletionResponse, ToolDefinition};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Token cap for the connection test request.
const PROBE_MAX_TOKENS: u32 = 16;

// ─── InferenceClient ─────────────────────────────────────────────────────────

/// Client for the model endpoint. Cheap to share behind an `Arc`.
pub struct InferenceClient {
    http: HttpClient,
    model: ModelConfig,
}

impl InferenceClient {
    /// Create a client. Does NOT check connectivity; that happens on the
    /// first request or through `test_connection`.
    pub fn new(model: ModelConfig) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(model.request_timeout_secs))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: model.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, model })
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    // ─── Chat Completion ─────────────────────────────────────────────────

    /// Send one chat completion request and parse the assistant turn.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<CompletionResponse, InferenceError> {
        self.model.validate()?;
        self.send(messages, tools, self.model.max_tokens).await
    }

    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
        max_tokens: u32,
    ) -> Result<CompletionResponse, InferenceError> {
        let url = self.model.completions_url();
        let body = ChatCompletionRequest {
            model: self.model.request_model(),
            messages,
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
            temperature: self.model.temperature,
            max_tokens,
            stream: false,
        };

        // Log the request metadata (not the full body, it can be large)
        tracing::info!(
            model = %self.model.display_name(),
            message_count = body.messages.len(),
            tool_count = body.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            max_tokens = body.max_tokens,
            "llm request"
        );

        let request = self.http.post(&url).json(&body);
        let request = match self.model.provider {
            Provider::OpenAi => request.bearer_auth(self.model.api_key.as_deref().unwrap_or_default()),
            Provider::Azure => request.header("api-key", self.model.api_key.as_deref().unwrap_or_default()),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout {
                    duration_secs: self.model.request_timeout_secs,
                }
            } else {
                InferenceError::ConnectionFailed {
                    endpoint: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let body = api_error_message(&body_text).unwrap_or(body_text);
            tracing::warn!(status = status.as_u16(), body = %body, "llm request rejected");
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body_text = response.text().await.map_err(|e| InferenceError::ResponseError {
            reason: format!("failed to read response body: {e}"),
        })?;

        let parsed = parse_completion_response(&body_text)?;
        tracing::info!(
            tool_calls = parsed.tool_calls.len(),
            finish_reason = parsed.finish_reason.as_deref().unwrap_or("none"),
            "llm response"
        );
        Ok(parsed)
    }

    // ─── Connection Test ─────────────────────────────────────────────────

    /// Send a minimal chat request and report whether the model answered.
    pub async fn test_connection(&self) -> ConnectionStatus {
        tracing::info!(model = %self.model.display_name(), "testing model connection");

        let outcome = match self.model.validate() {
            Ok(()) => {
                self.send(
                    vec![ChatMessage::user("Hello, connection test!")],
                    None,
                    PROBE_MAX_TOKENS,
                )
                .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(resp) => ConnectionStatus::connected(resp.content),
            Err(e) => {
                tracing::error!(error = %e, "model connection test failed");
                ConnectionStatus::failed(&e)
            }
        }
    }
}

/// Result of `InferenceClient::test_connection`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    /// `"connected"` or `"error"`.
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ConnectionStatus {
    pub fn connected(response: Option<String>) -> Self {
        Self {
            status: "connected".to_string(),
            message: "Connection to the language model is working".to_string(),
            details: None,
            response,
        }
    }

    pub fn failed(err: &InferenceError) -> Self {
        let message = match err.cause() {
            FailureCause::Authentication => "Authentication error: check the API key".to_string(),
            FailureCause::Endpoint => "Endpoint error: check the model URL".to_string(),
            FailureCause::Deployment => "Deployment error: check the deployment name".to_string(),
            FailureCause::Other => format!("Connection error: {err}"),
        };
        Self {
            status: "error".to_string(),
            message,
            details: Some(err.to_string()),
            response: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
