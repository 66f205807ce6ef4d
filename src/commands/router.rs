//! Command routing for REPL input.
//!
//! Turns one input line into a [`Command`]. Lines that do not start with `/`
//! are questions for the assistant.

use super::tokenizer::{tokenize, Token};

/// Parsed REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Update the connection form with these fields, then connect.
    Connect(Vec<(String, String)>),
    /// Show the connection form and state.
    Status,
    /// Reprint the conversation.
    History,
    /// Show help.
    Help,
    /// Exit the application.
    Quit,
    /// A question for the assistant.
    Question(String),
    /// A known command with malformed arguments.
    Invalid { command: String, message: String },
    /// Unknown slash command.
    Unknown(String),
}

/// Command router for parsing user input.
pub struct CommandRouter;

impl CommandRouter {
    /// Parses one line of input.
    ///
    /// Blank input parses as an empty question, which the session ignores.
    pub fn parse(input: &str) -> Command {
        let input = input.trim();

        if !input.starts_with('/') {
            return Command::Question(input.to_string());
        }

        let (command, args) = match input.split_once(char::is_whitespace) {
            Some((command, args)) => (command.to_lowercase(), args.trim()),
            None => (input.to_lowercase(), ""),
        };

        match command.as_str() {
            "/connect" => Self::parse_connect(args),
            "/status" => Command::Status,
            "/history" => Command::History,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(command),
        }
    }

    fn parse_connect(args: &str) -> Command {
        let mut fields = Vec::new();

        for token in tokenize(args) {
            match token {
                Token::KeyValue { key, value } => fields.push((key.to_lowercase(), value)),
                Token::Word(word) => {
                    return Command::Invalid {
                        command: "/connect".to_string(),
                        message: format!(
                            "Expected key=value, got '{word}'. Usage: /connect host=... port=... user=... password=... database=..."
                        ),
                    }
                }
            }
        }

        Command::Connect(fields)
    }
}
