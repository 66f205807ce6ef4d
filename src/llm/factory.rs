//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::error::{ChatError, Result};
use crate::llm::{
    GeminiClient, GeminiConfig, LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig,
};

/// Creates an LLM client for the given provider.
///
/// If `api_key` is provided, it takes precedence over the environment. For
/// providers that require a key, it is otherwise read from the provider's
/// environment variable (`GOOGLE_API_KEY` or `OPENAI_API_KEY`). A missing key
/// is a configuration error.
///
/// `model` falls back to the provider's default model.
pub fn create_client(
    provider: LlmProvider,
    model: Option<String>,
    api_key: Option<String>,
) -> Result<Box<dyn LlmClient>> {
    let model = model.unwrap_or_else(|| provider.default_model().to_string());

    match provider {
        LlmProvider::Gemini => {
            let key = resolve_api_key(provider, api_key)?;
            Ok(Box::new(GeminiClient::new(GeminiConfig::new(key, model))?))
        }
        LlmProvider::OpenAi => {
            let key = resolve_api_key(provider, api_key)?;
            Ok(Box::new(OpenAiClient::new(OpenAiConfig::new(key, model))?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

fn resolve_api_key(provider: LlmProvider, api_key: Option<String>) -> Result<String> {
    let Some(var) = provider.api_key_env() else {
        return Ok(String::new());
    };

    api_key
        .or_else(|| std::env::var(var).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ChatError::config(format!(
                "{provider} API key is missing! Please set {var} in the environment or .env file."
            ))
        })
}
