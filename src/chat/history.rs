//! Conversation history for a chat session.

use std::fmt;

/// First turn of every session.
pub const GREETING: &str = "Hello! I'm a SQL assistant. Ask me anything about your database.";

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationTurn {
    /// Text produced by the assistant.
    Assistant(String),
    /// Text typed by the user.
    User(String),
}

impl ConversationTurn {
    /// The turn's text.
    pub fn content(&self) -> &str {
        match self {
            Self::Assistant(text) | Self::User(text) => text,
        }
    }

    /// Speaker label used in prompts.
    pub fn speaker(&self) -> &'static str {
        match self {
            Self::Assistant(_) => "Assistant",
            Self::User(_) => "User",
        }
    }
}

impl fmt::Display for ConversationTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker(), self.content())
    }
}

/// Append-only sequence of turns, starting with the greeting.
///
/// Turns cannot be removed or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Creates a history holding only the greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![ConversationTurn::Assistant(GREETING.to_string())],
        }
    }

    /// Appends a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::User(content.into()));
    }

    /// Appends an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn::Assistant(content.into()));
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The most recent turn. Never `None`: the greeting is always present.
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false, since the greeting is always present.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Renders every turn, one `Speaker: text` line each, for the synthesis prompt.
    pub fn render_for_prompt(&self) -> String {
        self.turns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
