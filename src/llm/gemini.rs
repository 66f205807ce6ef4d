//! Google Gemini LLM client implementation.
//!
//! Implements the LlmClient trait for the Gemini `generateContent` REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Gemini API base URL; the model and method are appended.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (e.g., "gemini-1.5-pro").
    pub model: String,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl GeminiConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

/// Gemini LLM client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Creates a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    /// Builds the request body.
    ///
    /// System messages are joined into `systemInstruction`; assistant turns
    /// use Gemini's `model` role.
    fn build_request(messages: &[Message]) -> GeminiRequest {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: (!system_text.is_empty()).then(|| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system_text }],
            }),
        }
    }

    /// Extracts the text of the first candidate, concatenating its parts.
    fn extract_text(response: GeminiResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::llm("No response from Gemini"))?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }

    /// Maps an unsuccessful API response to an error.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> ChatError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return ChatError::llm("Authentication failed. Check your GOOGLE_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return ChatError::llm("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            return ChatError::llm(format!(
                "Gemini API error: {}",
                error_response.error.message
            ));
        }

        ChatError::llm(format!("Gemini API error ({}): {}", status, body))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = Self::build_request(messages);

        debug!("Gemini request with model {}", self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::llm("Request timed out. Try again.")
                } else if e.is_connect() {
                    ChatError::llm("Failed to connect to Gemini API. Check your network.")
                } else {
                    ChatError::llm(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::llm(format!("Failed to read response: {}", e)))?;

        debug!("Gemini response status {}", status);

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::llm(format!("Failed to parse response: {}", e)))?;

        Self::extract_text(response)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
