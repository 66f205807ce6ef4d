//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{
    Column, ColumnInfo, DatabaseClient, ForeignKey, QueryResult, Row, Schema, Table, Value,
    SAMPLE_ROWS_PER_TABLE,
};
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as SqlxColumn, Either, Executor, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Time allowed to obtain a connection from the pool when connecting.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Opens a connection pool for the given form.
    ///
    /// A single attempt is made. Driver failures are mapped to a
    /// `ChatError::Connection` with a user-facing message.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;
        info!("Connecting to {}", config.display_string());

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Connection to {} failed: {}", config.display_string(), e);
                map_connection_error(e, config)
            })?;

        info!("Connected to {}", config.display_string());
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        let tables = self.fetch_tables().await?;
        let foreign_keys = self.fetch_foreign_keys().await?;

        Ok(Schema {
            tables,
            foreign_keys,
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        // raw_sql goes over the text protocol, so every value arrives as text
        // and multi-statement strings are accepted as-is.
        let mut stream = self.pool.fetch_many(sqlx::raw_sql(sql));

        let mut rows: Vec<MySqlRow> = Vec::new();
        let mut rows_affected = 0;

        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| ChatError::query(format_query_error(e)))?
        {
            match item {
                Either::Left(done) => rows_affected += done.rows_affected(),
                Either::Right(row) => rows.push(row),
            }
        }

        let execution_time = start.elapsed();
        debug!(
            "Query returned {} rows ({} affected) in {:?}",
            rows.len(),
            rows_affected,
            execution_time
        );

        let columns: Vec<ColumnInfo> = rows
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(QueryResult {
            columns,
            rows: rows.iter().map(convert_row).collect(),
            execution_time,
            rows_affected,
        })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

impl MySqlClient {
    /// Fetches all base tables of the current database.
    async fn fetch_tables(&self) -> Result<Vec<Table>> {
        let table_names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT CAST(table_name AS CHAR)
            FROM information_schema.tables
            WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to fetch tables: {e}")))?;

        let mut tables = Vec::with_capacity(table_names.len());

        for table_name in table_names {
            let columns = self.fetch_columns(&table_name).await?;
            let primary_key = self.fetch_primary_key(&table_name).await?;
            let sample_rows = self.fetch_sample_rows(&table_name).await;

            tables.push(Table {
                name: table_name,
                columns,
                primary_key,
                sample_rows,
            });
        }

        Ok(tables)
    }

    /// Fetches columns for a specific table.
    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<Column>> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT
                CAST(column_name AS CHAR),
                CAST(column_type AS CHAR),
                CAST(is_nullable AS CHAR),
                CAST(column_default AS CHAR)
            FROM information_schema.columns
            WHERE table_schema = DATABASE() AND table_name = ?
            ORDER BY ordinal_position
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            ChatError::query(format!("Failed to fetch columns for {table_name}: {e}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| Column {
                name,
                data_type,
                is_nullable: is_nullable == "YES",
                default,
            })
            .collect())
    }

    /// Fetches primary key columns for a specific table.
    async fn fetch_primary_key(&self, table_name: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT CAST(column_name AS CHAR)
            FROM information_schema.key_column_usage
            WHERE table_schema = DATABASE()
                AND table_name = ?
                AND constraint_name = 'PRIMARY'
            ORDER BY ordinal_position
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            ChatError::query(format!("Failed to fetch primary key for {table_name}: {e}"))
        })
    }

    /// Fetches a few rows of a table. Failures leave the sample empty.
    async fn fetch_sample_rows(&self, table_name: &str) -> Vec<Row> {
        let sql = format!(
            "SELECT * FROM `{}` LIMIT {}",
            table_name.replace('`', "``"),
            SAMPLE_ROWS_PER_TABLE
        );

        match sqlx::raw_sql(&sql).fetch_all(&self.pool).await {
            Ok(rows) => rows.iter().map(convert_row).collect(),
            Err(e) => {
                warn!("Could not sample rows from {}: {}", table_name, e);
                Vec::new()
            }
        }
    }

    /// Fetches all foreign key relationships, grouped by constraint.
    async fn fetch_foreign_keys(&self) -> Result<Vec<ForeignKey>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT
                CAST(constraint_name AS CHAR),
                CAST(table_name AS CHAR),
                CAST(column_name AS CHAR),
                CAST(referenced_table_name AS CHAR),
                CAST(referenced_column_name AS CHAR)
            FROM information_schema.key_column_usage
            WHERE table_schema = DATABASE()
                AND referenced_table_name IS NOT NULL
            ORDER BY table_name, constraint_name, ordinal_position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to fetch foreign keys: {e}")))?;

        let mut grouped: Vec<(String, ForeignKey)> = Vec::new();

        for (constraint, from_table, from_column, to_table, to_column) in rows {
            match grouped.last_mut() {
                Some((name, fk)) if *name == constraint && fk.from_table == from_table => {
                    fk.from_columns.push(from_column);
                    fk.to_columns.push(to_column);
                }
                _ => grouped.push((
                    constraint,
                    ForeignKey::new(from_table, vec![from_column], to_table, vec![to_column]),
                )),
            }
        }

        Ok(grouped.into_iter().map(|(_, fk)| fk).collect())
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single text-protocol column value to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let type_name = type_name.to_uppercase();

    if is_binary_type(&type_name) {
        return match row.try_get_unchecked::<Option<Vec<u8>>, _>(index) {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => Value::String(text),
                Err(e) => Value::Bytes(e.into_bytes()),
            },
            _ => Value::Null,
        };
    }

    let Some(text) = row
        .try_get_unchecked::<Option<String>, _>(index)
        .ok()
        .flatten()
    else {
        return Value::Null;
    };

    parse_text_value(&type_name, text)
}

/// Interprets a text-protocol value according to its column type.
fn parse_text_value(type_name: &str, text: String) -> Value {
    let unsigned = type_name.ends_with("UNSIGNED");

    match type_name.split_whitespace().next().unwrap_or_default() {
        // TINYINT(1) is reported as BOOLEAN; the server still sends 0 or 1.
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            if let Ok(v) = text.parse::<i64>() {
                Value::Int(v)
            } else if let (true, Ok(v)) = (unsigned, text.parse::<u64>()) {
                Value::UInt(v)
            } else {
                Value::String(text)
            }
        }
        "FLOAT" | "DOUBLE" => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::String(text)),
        "DECIMAL" | "NUMERIC" => Value::Decimal(text),
        // dates, times, JSON and character types keep their text form
        _ => Value::String(text),
    }
}

fn is_binary_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" | "GEOMETRY"
    )
}

/// Builds driver options from the form fields.
///
/// The fields are passed to the driver one by one rather than through a URI,
/// so user names and passwords need no escaping.
fn connect_options(config: &ConnectionConfig) -> Result<MySqlConnectOptions> {
    let port = config.port.trim().parse::<u16>().map_err(|_| {
        ChatError::connection(format!(
            "Invalid port '{}'. Expected a number between 0 and 65535.",
            config.port
        ))
    })?;

    Ok(MySqlConnectOptions::new()
        .host(&config.host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ChatError {
    let error_str = error.to_string().to_lowercase();
    let host = &config.host;
    let port = &config.port;

    if error_str.contains("connection refused") {
        ChatError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        ChatError::connection(format!(
            "Access denied for user '{}'. Check your credentials.",
            config.user
        ))
    } else if error_str.contains("unknown database") {
        ChatError::connection(format!("Database '{}' does not exist.", config.database))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ChatError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ChatError::connection(error.to_string())
    }
}

/// Formats a query error, prefixing the server error code when available.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("({}) {}", code, db_error.message()),
            None => db_error.message().to_string(),
        },
        None => error.to_string(),
    }
}
