//! Bulk INSERT generation
//!
//! One multi-row `INSERT ... VALUES` per non-empty table, rendered from the
//! same layout as the DDL so both scripts name the same columns.

use crate::melt::{Row, SqlData, VideoHashEntry};
use crate::schema::builder::{quote_ident, table_ident};
use crate::schema::layout::{layouts, ColumnDef, ColumnRole, TableLayout};
use serde_json::Value;
use tracing::{debug, warn};

/// SQL literal for one value
///
/// Objects and arrays are stored as their JSON text.
pub fn escape_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Columns that receive a value in the INSERT
///
/// Natural keys are always written. The surrogate `id` is written as the
/// 1-based row number only when `include_id` is set; otherwise SQLite assigns it.
fn populated_columns(layout: &TableLayout, include_id: bool) -> Vec<&ColumnDef> {
    layout
        .columns
        .iter()
        .filter(|c| include_id || c.role != ColumnRole::Surrogate)
        .collect()
}

fn insert_sql(layout: &TableLayout, rows: &[Row], owner: &str, include_id: bool) -> String {
    let columns = populated_columns(layout, include_id);
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();

    let tuples: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let values: Vec<String> = columns
                .iter()
                .map(|column| match (&column.role, &column.key) {
                    (ColumnRole::Surrogate, _) => (index + 1).to_string(),
                    (ColumnRole::Owner, _) => owner.to_string(),
                    (_, Some(key)) => row.get(key).map_or_else(|| "NULL".to_string(), escape_value),
                    (_, None) => "NULL".to_string(),
                })
                .collect();
            format!("({})", values.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES\n{};\n\n",
        table_ident(layout),
        names.join(", "),
        tuples.join(",\n")
    )
}

fn video_hash_rows(entries: &[VideoHashEntry]) -> Vec<Row> {
    entries
        .iter()
        .map(|entry| {
            let mut row = Row::new();
            row.insert("hashId".to_string(), Value::String(entry.hash_id.clone()));
            row.insert("link".to_string(), Value::String(entry.link.clone()));
            row.insert("deleted".to_string(), Value::Bool(entry.deleted));
            row
        })
        .collect()
}

/// DML for every non-empty table of `data`
///
/// Order follows the DDL: users, video_hash, then the section tables. Without
/// a user name the owned tables cannot satisfy `userName NOT NULL`; they are
/// replaced by a comment naming the skipped row count.
pub fn generate_inserts(data: &SqlData, include_id: bool) -> String {
    let owner = data.user_name.as_deref().map(quote_literal);

    let mut output = format!(
        "-- INSERT statements for user: {}\n\n",
        data.user_name.as_deref().unwrap_or("unknown")
    );
    let video_hash = video_hash_rows(&data.video_hash);
    let mut statements = 0;
    let mut skipped = 0;

    for layout in layouts(data) {
        let rows: &[Row] = match layout.source.as_deref() {
            Some(source) => data.data.get(source).unwrap_or(&[]),
            None => &video_hash,
        };
        if rows.is_empty() {
            continue;
        }

        let owned = layout.columns.iter().any(|c| c.role == ColumnRole::Owner);
        match (&owner, owned) {
            (None, true) => {
                output.push_str(&format!(
                    "-- {}: {} rows skipped, profile has no userName\n\n",
                    layout.name,
                    rows.len()
                ));
                skipped += rows.len();
            }
            (owner, _) => {
                let owner = owner.as_deref().unwrap_or("NULL");
                output.push_str(&insert_sql(&layout, rows, owner, include_id));
                statements += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Profile has no userName; owned rows were not inserted");
    }
    debug!(statements, "Generated inserts");
    output
}
