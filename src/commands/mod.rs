//! Command parsing for the chat REPL.
//!
//! Parsing is kept separate from execution so it can be unit tested without
//! a database or an LLM.

pub mod help;
pub mod router;
pub mod tokenizer;

pub use help::HELP_TEXT;
pub use router::{Command, CommandRouter};
pub use tokenizer::{tokenize, Token};
