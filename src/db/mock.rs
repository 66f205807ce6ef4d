//! Mock database clients for testing.
//!
//! Provides an in-memory database implementation for headless runs and tests,
//! plus a client whose every call fails.

use super::{ColumnInfo, DatabaseClient, QueryResult, Schema, Value};
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock database client that returns predefined results.
///
/// Canned results and errors are matched by substring against the executed
/// SQL, first match wins. Every executed statement is recorded.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    schema: Schema,
    results: Vec<(String, QueryResult)>,
    errors: Vec<(String, String)>,
    executed: Mutex<Vec<String>>,
    schema_fetches: AtomicUsize,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock database client with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Returns `result` for any SQL containing `pattern`.
    pub fn with_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.results.push((pattern.into(), result));
        self
    }

    /// Fails with a query error for any SQL containing `pattern`.
    pub fn with_error(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.push((pattern.into(), message.into()));
        self
    }

    /// Statements executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Number of schema introspections performed so far.
    pub fn schema_fetches(&self) -> usize {
        self.schema_fetches.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        self.schema_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.schema.clone())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.record(sql);

        if let Some((_, message)) = self.errors.iter().find(|(p, _)| sql.contains(p.as_str())) {
            return Err(ChatError::query(message.clone()));
        }

        if let Some((_, result)) = self.results.iter().find(|(p, _)| sql.contains(p.as_str())) {
            return Ok(result.clone());
        }

        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            let columns = vec![ColumnInfo::new("result", "TEXT")];
            let rows = vec![vec![Value::String(format!("Mock result for: {sql}"))]];
            Ok(QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1)))
        } else {
            Ok(QueryResult::affected(0).with_execution_time(Duration::from_millis(1)))
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every operation fails.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client that reports `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        Err(ChatError::query(self.message.clone()))
    }

    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(ChatError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
