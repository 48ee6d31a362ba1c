//! DDL generation for the normalized mapping
//!
//! Emits one `CREATE TABLE IF NOT EXISTS` per table, separated by blank lines:
//! `users` from the profile row, the `video_hash` side table, then every
//! other section table in mapping order.

use crate::melt::SqlData;
use crate::schema::layout::{layouts, ColumnDef, ColumnRole, TableLayout, OWNER_COLUMN};
use tracing::debug;

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_sql(column: &ColumnDef) -> String {
    match column.role {
        ColumnRole::Surrogate => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column.name),
        ColumnRole::Owner => format!("{} TEXT NOT NULL REFERENCES users({})", column.name, OWNER_COLUMN),
        ColumnRole::PrimaryKey if column.name == OWNER_COLUMN => {
            format!("{} {} PRIMARY KEY", column.name, column.sql_type.as_str())
        }
        ColumnRole::PrimaryKey => format!(
            "{} {} PRIMARY KEY",
            quote_ident(&column.name),
            column.sql_type.as_str()
        ),
        ColumnRole::Data => format!("{} {}", quote_ident(&column.name), column.sql_type.as_str()),
    }
}

/// Table names are quoted except the two fixed tables
pub fn table_ident(layout: &TableLayout) -> String {
    if layout.source.as_deref() == Some(layout.name.as_str()) {
        quote_ident(&layout.name)
    } else {
        layout.name.clone()
    }
}

pub fn create_table_sql(layout: &TableLayout) -> String {
    let mut lines: Vec<String> = layout.columns.iter().map(column_sql).collect();
    if layout.references_video_hash {
        lines.push("FOREIGN KEY (shortId) REFERENCES video_hash(hashId)".to_string());
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        table_ident(layout),
        lines.join(",\n    ")
    )
}

/// DDL for every table of `data`
pub fn generate_schema(data: &SqlData) -> String {
    let statements: Vec<String> = layouts(data).iter().map(create_table_sql).collect();
    debug!(tables = statements.len(), "Generated schema");
    statements.join("\n\n")
}
