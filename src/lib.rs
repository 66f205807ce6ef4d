//! sqlchat - chat with a MySQL database in plain language.
//!
//! The library exposes the modules behind the binary for integration tests.

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod repl;
