//! Error types for sqlchat.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sqlchat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Database connection errors (missing fields, host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, unknown tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// LLM API errors (rate limits, auth, malformed responses, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (missing API key, invalid config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A question was asked before any database was connected.
    #[error("{0}")]
    NotConnected(String),

    /// Internal application errors (I/O on the terminal, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a not-connected error with the given message.
    pub fn not_connected(msg: impl Into<String>) -> Self {
        Self::NotConnected(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::NotConnected(_) => "Not Connected",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Result type alias using ChatError.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = ChatError::connection("Cannot connect to localhost:3306");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:3306"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = ChatError::query("Table 'shop.rank' doesn't exist");
        assert_eq!(
            err.to_string(),
            "Query error: Table 'shop.rank' doesn't exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_llm() {
        let err = ChatError::llm("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "LLM error: Rate limited. Please wait.");
        assert_eq!(err.category(), "LLM Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = ChatError::config("GOOGLE_API_KEY is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: GOOGLE_API_KEY is not set"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_not_connected() {
        let err = ChatError::not_connected("Please connect to the database first!");
        assert_eq!(err.to_string(), "Please connect to the database first!");
        assert_eq!(err.category(), "Not Connected");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: ChatError = io.into();
        assert_eq!(err.category(), "Internal Error");
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatError>();
    }
}
