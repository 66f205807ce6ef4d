//! Line-oriented chat loop.
//!
//! Reads one line at a time, routes it through [`CommandRouter`] and writes
//! the resulting scrollback lines. Generic over the reader and writer so that
//! tests and headless runs can script it.

use std::borrow::Cow;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::chat::{ConversationTurn, Session};
use crate::commands::{Command, CommandRouter, HELP_TEXT};
use crate::config::ConnectionConfig;
use crate::error::Result;

const PROMPT: &str = "You: ";
const CONNECTED_MESSAGE: &str = "Connected to database!";

/// Result of handling one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Nothing to print.
    None,
    /// Lines to append to the scrollback.
    Lines(Vec<String>),
    /// The user asked to leave.
    Exit,
}

/// The REPL: a session plus the connection form that feeds it.
pub struct Repl {
    session: Session,
    form: ConnectionConfig,
    show_prompt: bool,
}

impl Repl {
    pub fn new(session: Session, form: ConnectionConfig) -> Self {
        Self {
            session,
            form,
            show_prompt: true,
        }
    }

    /// Enables or disables the input prompt. Headless runs turn it off.
    pub fn with_prompt(mut self, show_prompt: bool) -> Self {
        self.show_prompt = show_prompt;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn form(&self) -> &ConnectionConfig {
        &self.form
    }

    /// Runs until end of input or `/quit`, then closes the connection.
    ///
    /// The connection is closed even when reading or writing fails. Input
    /// that is not valid UTF-8 is decoded lossily.
    pub async fn run<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = self.chat_loop(reader, writer).await;
        info!("Chat loop finished");
        let closed = self.session.close().await;
        result.and(closed)
    }

    async fn chat_loop<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        for turn in self.session.history().turns() {
            write_lines(&mut writer, &[format_turn(turn)]).await?;
        }

        let mut buf = Vec::new();
        loop {
            if self.show_prompt {
                writer.write_all(PROMPT.as_bytes()).await?;
                writer.flush().await?;
            }

            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                warn!("Input line was not valid UTF-8; decoded lossily");
            }

            match self.handle_input(&line).await {
                InputResult::None => {}
                InputResult::Lines(lines) => write_lines(&mut writer, &lines).await?,
                InputResult::Exit => return Ok(()),
            }
        }
    }

    /// Handles one line of input.
    pub async fn handle_input(&mut self, input: &str) -> InputResult {
        match CommandRouter::parse(input) {
            Command::Question(question) => self.handle_question(&question).await,
            Command::Connect(fields) => self.handle_connect(fields).await,
            Command::Status => InputResult::Lines(self.status_lines()),
            Command::History => InputResult::Lines(
                self.session
                    .history()
                    .turns()
                    .iter()
                    .map(format_turn)
                    .collect(),
            ),
            Command::Help => InputResult::Lines(vec![HELP_TEXT.to_string()]),
            Command::Quit => InputResult::Exit,
            Command::Invalid { command, message } => {
                InputResult::Lines(vec![format!("Error: {command}: {message}")])
            }
            Command::Unknown(command) => InputResult::Lines(vec![format!(
                "Error: Unknown command: {command}. Type /help for available commands."
            )]),
        }
    }

    async fn handle_question(&mut self, question: &str) -> InputResult {
        match self.session.ask(question).await {
            Ok(Some(outcome)) => InputResult::Lines(vec![format!("AI: {}", outcome.message())]),
            Ok(None) => InputResult::None,
            Err(e) => InputResult::Lines(vec![format!("Error: {e}")]),
        }
    }

    /// Merges the given fields into the form and connects.
    ///
    /// The form is left unchanged if any field name is unknown. Values that
    /// were merged stay in the form even when the connection fails.
    async fn handle_connect(&mut self, fields: Vec<(String, String)>) -> InputResult {
        let mut form = self.form.clone();
        for (key, value) in fields {
            if let Err(e) = form.set_field(&key, value) {
                return InputResult::Lines(vec![format!("Error: {e}")]);
            }
        }
        self.form = form;

        match self.session.connect(&self.form).await {
            Ok(()) => InputResult::Lines(vec![CONNECTED_MESSAGE.to_string()]),
            Err(e) => {
                warn!("Connect failed: {}", e);
                InputResult::Lines(vec![format!("Error: {e}")])
            }
        }
    }

    fn status_lines(&self) -> Vec<String> {
        let state = match self.session.connection_label() {
            Some(label) => format!("Connected: {label}"),
            None => "Not connected".to_string(),
        };
        let password = if self.form.password.is_empty() {
            "(empty)"
        } else {
            "(set)"
        };

        vec![
            state,
            format!(
                "Form: host={} port={} user={} password={} database={}",
                self.form.host, self.form.port, self.form.user, password, self.form.database
            ),
        ]
    }
}

/// Renders a turn as a scrollback line.
pub fn format_turn(turn: &ConversationTurn) -> String {
    match turn {
        ConversationTurn::Assistant(text) => format!("AI: {text}"),
        ConversationTurn::User(text) => format!("You: {text}"),
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}
