//! Interactive session state.
//!
//! A [`Session`] owns everything that lives as long as one chat: the LLM
//! client, the current database connection and the conversation history.

use std::sync::Arc;
use tracing::info;

use crate::chat::history::ConversationHistory;
use crate::chat::pipeline::{TurnOrchestrator, TurnOutcome};
use crate::config::ConnectionConfig;
use crate::db::{self, DatabaseClient};
use crate::error::{ChatError, Result};
use crate::llm::LlmClient;

/// Reply when a question arrives before any connection exists.
pub const NOT_CONNECTED_MESSAGE: &str = "Please connect to the database first!";

/// One chat session.
pub struct Session {
    llm: Box<dyn LlmClient>,
    db: Option<Arc<dyn DatabaseClient>>,
    connection_label: Option<String>,
    history: ConversationHistory,
}

impl Session {
    /// Creates a session with the greeting history and no connection.
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self {
            llm,
            db: None,
            connection_label: None,
            history: ConversationHistory::new(),
        }
    }

    /// Connects using the form, replacing any previous connection.
    ///
    /// Nothing is attempted unless every field is filled in. On failure the
    /// previous connection, if any, is kept.
    pub async fn connect(&mut self, form: &ConnectionConfig) -> Result<()> {
        let client = db::connect(form).await?;
        self.attach(Arc::from(client), form.display_string());
        Ok(())
    }

    /// Installs an already-open client as the session's connection.
    pub fn attach(&mut self, client: Arc<dyn DatabaseClient>, label: impl Into<String>) {
        let label = label.into();
        info!("Session connected to {}", label);
        self.db = Some(client);
        self.connection_label = Some(label);
    }

    /// Answers one question.
    ///
    /// Blank input is ignored and yields `Ok(None)`. Without a connection the
    /// question is rejected and the history is left untouched. Otherwise the
    /// question and exactly one reply are appended to the history.
    pub async fn ask(&mut self, question: &str) -> Result<Option<TurnOutcome>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        let Some(db) = self.db.as_ref() else {
            return Err(ChatError::not_connected(NOT_CONNECTED_MESSAGE));
        };

        self.history.push_user(question);

        let outcome = TurnOrchestrator::new(db.as_ref(), self.llm.as_ref())
            .run_turn(question, &self.history)
            .await;

        self.history.push_assistant(outcome.message());
        Ok(Some(outcome))
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    /// Display string of the current connection, without password.
    pub fn connection_label(&self) -> Option<&str> {
        self.connection_label.as_deref()
    }

    /// Closes the current connection, if any. Called once at shutdown.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(db) = self.db.take() {
            db.close().await?;
        }
        self.connection_label = None;
        Ok(())
    }
}
