//! Database schema types for sqlchat.
//!
//! Represents the structure of a database (tables, columns, foreign keys and a
//! few sample rows per table) and renders it as the schema text both prompts
//! embed.

use super::types::Row;

/// Number of sample rows fetched per table for the schema text.
pub const SAMPLE_ROWS_PER_TABLE: usize = 3;

/// Represents the complete schema of a database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// All tables in the schema.
    pub tables: Vec<Table>,

    /// Foreign key relationships between tables.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the schema for inclusion in an LLM prompt.
    ///
    /// Each table becomes a `CREATE TABLE` statement followed by a comment
    /// block holding its sample rows, tab-separated under a header line.
    pub fn format_for_llm(&self) -> String {
        self.tables
            .iter()
            .map(|table| self.format_table_for_llm(table))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_table_for_llm(&self, table: &Table) -> String {
        let mut lines: Vec<String> = table.columns.iter().map(Self::format_column).collect();

        if !table.primary_key.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", quote_list(&table.primary_key)));
        }

        lines.extend(
            self.foreign_keys
                .iter()
                .filter(|fk| fk.from_table == table.name)
                .map(|fk| {
                    format!(
                        "FOREIGN KEY({}) REFERENCES `{}` ({})",
                        quote_list(&fk.from_columns),
                        fk.to_table,
                        quote_list(&fk.to_columns)
                    )
                }),
        );

        let create = format!(
            "CREATE TABLE `{}` (\n\t{}\n)",
            table.name,
            lines.join(", \n\t")
        );

        if table.sample_rows.is_empty() {
            return create;
        }

        let header = table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join("\t");
        let rows = table
            .sample_rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_display_string())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{create}\n\n/*\n{} rows from {} table:\n{header}\n{rows}\n*/",
            table.sample_rows.len(),
            table.name
        )
    }

    fn format_column(column: &Column) -> String {
        let mut line = format!("`{}` {}", column.name, column.data_type);
        if !column.is_nullable {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
        line
    }
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Represents a database table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in the table.
    pub columns: Vec<Column>,

    /// Column names that form the primary key.
    pub primary_key: Vec<String>,

    /// Up to [`SAMPLE_ROWS_PER_TABLE`] rows, in column order.
    pub sample_rows: Vec<Row>,
}

impl Table {
    /// Creates a new table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type as reported by the server (e.g., "int", "varchar(255)").
    pub data_type: String,

    /// Whether the column allows NULL values.
    pub is_nullable: bool,

    /// Default value expression, if any.
    pub default: Option<String>,
}

impl Column {
    /// Creates a new column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default: None,
        }
    }

    /// Sets whether the column is nullable.
    pub fn nullable(self, nullable: bool) -> Self {
        Self {
            is_nullable: nullable,
            ..self
        }
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..self
        }
    }
}

/// Represents a foreign key relationship between tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKey {
    /// Source table name.
    pub from_table: String,

    /// Source column names.
    pub from_columns: Vec<String>,

    /// Target table name.
    pub to_table: String,

    /// Target column names.
    pub to_columns: Vec<String>,
}

impl ForeignKey {
    /// Creates a new foreign key relationship.
    pub fn new(
        from_table: impl Into<String>,
        from_columns: Vec<String>,
        to_table: impl Into<String>,
        to_columns: Vec<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_columns,
            to_table: to_table.into(),
            to_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;
    use pretty_assertions::assert_eq;

    fn sample_schema() -> Schema {
        Schema {
            tables: vec![
                Table {
                    name: "users".to_string(),
                    columns: vec![
                        Column::new("id", "int").nullable(false),
                        Column::new("name", "varchar(100)"),
                    ],
                    primary_key: vec!["id".to_string()],
                    sample_rows: vec![
                        vec![Value::Int(1), Value::from("Alice")],
                        vec![Value::Int(2), Value::Null],
                    ],
                },
                Table {
                    name: "orders".to_string(),
                    columns: vec![
                        Column::new("id", "int").nullable(false),
                        Column::new("user_id", "int").nullable(false),
                        Column::new("status", "varchar(20)")
                            .nullable(false)
                            .with_default("'pending'"),
                    ],
                    primary_key: vec!["id".to_string()],
                    sample_rows: vec![],
                },
            ],
            foreign_keys: vec![ForeignKey::new(
                "orders",
                vec!["user_id".to_string()],
                "users",
                vec!["id".to_string()],
            )],
        }
    }

    #[test]
    fn test_format_table_with_sample_rows() {
        let schema = sample_schema();
        let users = schema.format_table_for_llm(&schema.tables[0]);

        assert_eq!(
            users,
            "CREATE TABLE `users` (\n\
             \t`id` int NOT NULL, \n\
             \t`name` varchar(100), \n\
             \tPRIMARY KEY (`id`)\n\
             )\n\
             \n\
             /*\n\
             2 rows from users table:\n\
             id\tname\n\
             1\tAlice\n\
             2\tNULL\n\
             */"
        );
    }

    #[test]
    fn test_format_includes_foreign_keys_and_defaults() {
        let formatted = sample_schema().format_for_llm();

        assert!(formatted.contains("CREATE TABLE `orders`"));
        assert!(formatted.contains("`status` varchar(20) NOT NULL DEFAULT 'pending'"));
        assert!(formatted.contains("FOREIGN KEY(`user_id`) REFERENCES `users` (`id`)"));
        // orders has no sample rows, so no comment block follows it
        assert!(formatted.ends_with(")"));
    }

    #[test]
    fn test_tables_are_separated_by_blank_line() {
        let formatted = sample_schema().format_for_llm();
        assert!(formatted.contains("*/\n\nCREATE TABLE `orders`"));
    }

    #[test]
    fn test_column_builder() {
        let col = Column::new("email", "varchar(255)")
            .nullable(false)
            .with_default("''");

        assert_eq!(col.name, "email");
        assert_eq!(col.data_type, "varchar(255)");
        assert!(!col.is_nullable);
        assert_eq!(col.default, Some("''".to_string()));
    }

    #[test]
    fn test_empty_schema() {
        assert_eq!(Schema::new().format_for_llm(), "");
    }
}
