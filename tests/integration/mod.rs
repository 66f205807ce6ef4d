//! Integration tests for sqlchat.

pub mod mysql_test;
pub mod pipeline_test;
pub mod repl_test;
