//! Help text for the /help command.

/// Help text displayed for the /help command.
pub const HELP_TEXT: &str = r#"Type a question about your database to ask it in plain language.

Commands:
  /connect [host=...] [port=...] [user=...] [password=...] [database=...]
                   - Update the connection form and connect
  /status          - Show the connection form and connection state
  /history         - Reprint the conversation
  /help            - Show this help message
  /quit, /exit     - Exit the application

Values containing spaces can be quoted: password="my secret""#;
