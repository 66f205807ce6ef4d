//! Database abstraction layer for sqlchat.
//!
//! Provides a trait-based interface for the two read operations the chat
//! pipeline needs (schema text and query execution), so the MySQL client and
//! the test doubles can be used interchangeably.

mod mock;
mod mysql;
mod schema;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use schema::{Column, ForeignKey, Schema, Table, SAMPLE_ROWS_PER_TABLE};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::{ChatError, Result};
use async_trait::async_trait;

/// Message shown when the connection form is incomplete.
pub const FIELDS_REQUIRED_MESSAGE: &str = "All fields are required to connect to the database.";

/// Opens a database client from the connection form.
///
/// No driver call is made unless all five fields are filled in.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    if !config.is_complete() {
        return Err(ChatError::connection(FIELDS_REQUIRED_MESSAGE));
    }

    let client = MySqlClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with ChatError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Introspects the database schema, returning table and relationship information.
    async fn introspect_schema(&self) -> Result<Schema>;

    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;

    /// Returns the schema as prompt text. Introspects on every call.
    async fn schema_info(&self) -> Result<String> {
        Ok(self.introspect_schema().await?.format_for_llm())
    }

    /// Executes a SQL string and returns its result as text.
    async fn run(&self, sql: &str) -> Result<String> {
        Ok(self.execute_query(sql).await?.to_text())
    }
}
