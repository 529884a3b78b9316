use serde::{Deserialize, Serialize};

/// Destination column type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    /// Returns the SQLite type name
    pub fn to_sqlite(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

/// Quote an identifier for use in SQLite statements, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Generate the statement that removes a previous copy of the table
pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table_name))
}

/// Generate DDL statement for creating a table
///
/// `column_ids` and `column_types` are index-aligned. A column without a
/// type is declared without a type clause and gets SQLite's default affinity.
pub fn create_table_sql(
    table_name: &str,
    column_ids: &[String],
    column_types: &[Option<SqlType>],
) -> String {
    let column_defs: Vec<String> = column_ids
        .iter()
        .zip(column_types)
        .map(|(id, col_type)| match col_type {
            Some(t) => format!("{} {}", quote_ident(id), t.to_sqlite()),
            None => quote_ident(id),
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        quote_ident(table_name),
        column_defs.join(", ")
    )
}

/// Generate a positional INSERT statement with one placeholder per column
pub fn insert_sql(table_name: &str, num_columns: usize) -> String {
    let placeholders = vec!["?"; num_columns];
    format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(table_name),
        placeholders.join(", ")
    )
}
