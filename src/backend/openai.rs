//! OpenAI-compatible API backend
//!
//! Implements ModelBackend by calling the chat completions endpoint of any
//! OpenAI-compatible service with a strict `json_schema` response format.
//! Failures are classified here, at the boundary, from HTTP status and
//! transport error kind. This backend never retries on its own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ModelSettings;
use crate::error::{Error, Result};

use super::{AgentRequest, ModelBackend, Role};

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI-compatible backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// Transport-level timeout in seconds (a backstop behind the per-attempt guard)
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl From<&ModelSettings> for OpenAiConfig {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: settings.request_timeout_secs,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: Role,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible structured-output backend
pub struct OpenAiBackend {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend with the given configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %config.base_url, "OpenAI-compatible backend created");

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

/// Build the wire request for one attempt
fn build_request(request: &AgentRequest) -> ChatCompletionRequest<'_> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage {
        role: Role::System,
        content: request.persona.system_prompt(),
    });
    messages.extend(request.messages.iter().map(|turn| ChatMessage {
        role: turn.role,
        content: turn.content.clone(),
    }));

    ChatCompletionRequest {
        model: &request.model,
        messages,
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: &request.schema_name,
                strict: true,
                schema: &request.schema,
            },
        },
    }
}

/// Map a non-success HTTP status to a classified error
fn classify_status(status: StatusCode, body: &str) -> Error {
    let message = format!("API error {}: {}", status, body);
    match status.as_u16() {
        408 | 409 | 429 => Error::transient(message, Some(status.as_u16())),
        401 | 403 => Error::AuthenticationFailed { message },
        _ if status.is_server_error() => Error::transient(message, Some(status.as_u16())),
        _ => Error::backend(message, Some(status.as_u16())),
    }
}

/// Map a transport failure to a classified error. Anything that went wrong
/// on the wire (refused, reset, closed early, body cut short) is transient.
fn classify_transport(error: &reqwest::Error, timeout_secs: u64) -> Error {
    if error.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout_secs * 1000,
        }
    } else if error.is_connect() || error.is_request() || error.is_body() || error.is_decode() {
        Error::transient(format!("Connection error: {}", error), None)
    } else {
        Error::backend(format!("Request error: {}", error), None)
    }
}

/// Pull the content out of a parsed response
fn extract_content(response: ChatCompletionResponse) -> Result<Option<String>> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Ok(None);
    };

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(Error::backend(format!("Model refused: {}", refusal), None));
    }

    if choice.finish_reason.as_deref() == Some("length") {
        warn!("Model output truncated at token limit");
    }

    Ok(choice.message.content.filter(|c| !c.trim().is_empty()))
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &AgentRequest) -> Result<Option<String>> {
        let start = Instant::now();
        let body = build_request(request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&request.credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e, self.config.request_timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            let err = classify_status(status, &body);
            warn!(status = %status, retryable = err.is_retryable(), "Model service returned an error");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport(&e, self.config.request_timeout_secs))?;

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            Error::backend(format!("Failed to parse API response: {}", e), Some(status.as_u16()))
        })?;

        debug!(
            model = %request.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chat completion received"
        );

        extract_content(parsed)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
