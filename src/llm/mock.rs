//! Mock LLM client for testing.
//!
//! Provides deterministic responses and records every request it receives.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{ChatError, Result};
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// A canned reply: either text or an error message.
type Reply = std::result::Result<String, String>;

/// Mock LLM client that returns canned responses.
///
/// Replies are chosen in this order:
/// 1. the next entry of the scripted queue, if any;
/// 2. the first pattern whose text appears in the prompt;
/// 3. a default reply that is a SQL statement for synthesis prompts and a
///    plain sentence otherwise.
///
/// Clones share the same queue and request log.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    scripted: Arc<Mutex<VecDeque<Reply>>>,
    patterns: Vec<(String, String)>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the last prompt contains `pattern` (case-insensitive), the mock
    /// returns `response`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.patterns.push((pattern.into(), response.into()));
        self
    }

    /// Queues a reply to be returned by the next unanswered call.
    pub fn then_reply(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    /// Queues a failure to be returned by the next unanswered call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The prompt text of every request received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|messages| Self::extract_prompt(messages))
            .collect()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(reply);
        }
    }

    fn next_scripted(&self) -> Option<Reply> {
        self.scripted.lock().ok().and_then(|mut s| s.pop_front())
    }

    fn mock_response(&self, prompt: &str) -> String {
        let prompt_lower = prompt.to_lowercase();

        for (pattern, response) in &self.patterns {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if prompt.trim_end().ends_with("SQL Query:") {
            return "SELECT 1;".to_string();
        }

        "Here is what the query returned.".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_prompt(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::types::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }

        match self.next_scripted() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ChatError::llm(message)),
            None => Ok(self.mock_response(&Self::extract_prompt(messages))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_come_first_and_in_order() {
        let client = MockLlmClient::new()
            .with_response("anything", "pattern reply")
            .then_reply("first")
            .then_fail("quota exceeded");

        let messages = [Message::user("anything")];
        assert_eq!(client.complete(&messages).await.unwrap(), "first");
        let err = client.complete(&messages).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM error: quota exceeded");
        assert_eq!(client.complete(&messages).await.unwrap(), "pattern reply");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_default_replies() {
        let client = MockLlmClient::new();

        let sql = client
            .complete(&[Message::user("Question: how many?\nSQL Query:")])
            .await
            .unwrap();
        assert_eq!(sql, "SELECT 1;");

        let text = client
            .complete(&[Message::user("SQL Response: [(1)]")])
            .await
            .unwrap();
        assert_eq!(text, "Here is what the query returned.");
    }

    #[tokio::test]
    async fn test_clones_share_request_log() {
        let client = MockLlmClient::new();
        let observer = client.clone();

        client.complete(&[Message::user("hello")]).await.unwrap();

        assert_eq!(observer.prompts(), vec!["hello".to_string()]);
    }
}
