//! Query result types for sqlchat.
//!
//! Defines the structures used to represent query results from the database
//! and their text rendering for the explanation prompt.

use std::fmt;
use std::time::Duration;

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    pub execution_time: Duration,

    /// Rows changed by a statement that returns no result set.
    pub rows_affected: u64,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Creates a result for a statement that returns no rows.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in the result set.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the result as text for the explanation prompt.
    ///
    /// Rows become a bracketed list of tuples: `[(1, 'Alice'), (2, 'Bob')]`.
    /// A one-column row keeps a trailing comma: `[(42,)]`.
    /// An empty result set renders as an empty string. Statements without a
    /// result set render their affected-row count.
    pub fn to_text(&self) -> String {
        if self.columns.is_empty() && self.rows.is_empty() {
            if self.rows_affected > 0 {
                return format!("{} rows affected", self.rows_affected);
            }
            return String::new();
        }

        if self.rows.is_empty() {
            return String::new();
        }

        let tuples = self
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .map(Value::to_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                if row.len() == 1 {
                    format!("({values},)")
                } else {
                    format!("({values})")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("[{tuples}]")
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Signed integer (up to i64).
    Int(i64),

    /// Unsigned integer that doesn't fit in i64.
    UInt(u64),

    /// Floating point number.
    Float(f64),

    /// Exact numeric (DECIMAL) in the server's text form.
    Decimal(String),

    /// Text/string value (also used for dates and times).
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Plain display form, used in sample rows of the schema text.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.clone(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }

    /// Literal form, with strings single-quoted. Numbers, decimals included,
    /// stay bare.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
            other => other.to_display_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// MySQL has no boolean type; `TRUE` is the integer 1.
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
