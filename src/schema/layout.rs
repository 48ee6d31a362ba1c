//! Relational layout derived from the normalized mapping
//!
//! Both the DDL and the INSERT generator render from the same `TableLayout`,
//! so a table's declared columns and its populated columns always agree.

use crate::melt::{Row, SqlData};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Owner column appended to every non-user table
pub const OWNER_COLUMN: &str = "userName";

/// Surrogate key added when a table has no natural key
pub const SURROGATE_COLUMN: &str = "id";

const NATURAL_KEYS: [&str; 3] = ["id", "shortId", "hashId"];

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }

    /// Type of a single sample; `None` for null, which carries no type
    pub fn of_value(value: &Value) -> Option<SqlType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(SqlType::Integer),
            Value::Number(n) => {
                let integral = n.is_i64()
                    || n.is_u64()
                    || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0);
                Some(if integral { SqlType::Integer } else { SqlType::Real })
            }
            _ => Some(SqlType::Text),
        }
    }
}

/// Accumulates the types seen in one column across all rows
#[derive(Debug, Default)]
struct ColumnTypeBuilder {
    seen: HashSet<SqlType>,
}

impl ColumnTypeBuilder {
    fn add_value(&mut self, value: &Value) {
        if let Some(sql_type) = SqlType::of_value(value) {
            self.seen.insert(sql_type);
        }
    }

    /// Integer and real widen to real; anything textual, or nothing at all, is text
    fn build(&self) -> SqlType {
        if self.seen.is_empty() || self.seen.contains(&SqlType::Text) {
            SqlType::Text
        } else if self.seen.contains(&SqlType::Real) {
            SqlType::Real
        } else {
            SqlType::Integer
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Data,
    PrimaryKey,
    Surrogate,
    Owner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name in SQL
    pub name: String,
    /// Row key the value is read from; `None` for generated columns
    pub key: Option<String>,
    pub sql_type: SqlType,
    pub role: ColumnRole,
}

impl ColumnDef {
    /// A column read from `key`, renamed `<key>_value` while it clashes with a
    /// name already taken in this table, ignoring ASCII case
    fn data(key: &str, sql_type: SqlType, role: ColumnRole, taken: &mut HashSet<String>) -> Self {
        let mut name = key.to_string();
        while taken.contains(&name.to_ascii_lowercase()) {
            name.push_str("_value");
        }
        taken.insert(name.to_ascii_lowercase());
        ColumnDef {
            name,
            key: Some(key.to_string()),
            sql_type,
            role,
        }
    }

    fn owner() -> Self {
        ColumnDef {
            name: OWNER_COLUMN.to_string(),
            key: None,
            sql_type: SqlType::Text,
            role: ColumnRole::Owner,
        }
    }

    fn surrogate() -> Self {
        ColumnDef {
            name: SURROGATE_COLUMN.to_string(),
            key: None,
            sql_type: SqlType::Integer,
            role: ColumnRole::Surrogate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Table name in SQL
    pub name: String,
    /// Table key in the normalized mapping, `None` for the video hash side table
    pub source: Option<String>,
    pub columns: Vec<ColumnDef>,
    /// Whether `shortId` references `video_hash(hashId)`
    pub references_video_hash: bool,
}

/// The `users` table: `userName` is always the key, other profile fields follow
pub fn users_layout(rows: &[Row]) -> TableLayout {
    let mut columns = vec![ColumnDef {
        name: OWNER_COLUMN.to_string(),
        key: Some(OWNER_COLUMN.to_string()),
        sql_type: SqlType::Text,
        role: ColumnRole::PrimaryKey,
    }];

    if let Some(first) = rows.first() {
        let mut taken = reserved_names(&[OWNER_COLUMN]);
        for key in first.keys().filter(|k| k.as_str() != OWNER_COLUMN) {
            columns.push(ColumnDef::data(key, column_type(rows, key), ColumnRole::Data, &mut taken));
        }
    }

    TableLayout {
        name: "users".to_string(),
        source: Some("profile".to_string()),
        columns,
        references_video_hash: false,
    }
}

/// The `video_hash` side table
pub fn video_hash_layout() -> TableLayout {
    let column = |name: &str, sql_type, role| ColumnDef {
        name: name.to_string(),
        key: Some(name.to_string()),
        sql_type,
        role,
    };

    TableLayout {
        name: "video_hash".to_string(),
        source: None,
        columns: vec![
            column("hashId", SqlType::Text, ColumnRole::PrimaryKey),
            column("link", SqlType::Text, ColumnRole::Data),
            column("deleted", SqlType::Integer, ColumnRole::Data),
        ],
        references_video_hash: false,
    }
}

/// Any other table: column names from the first row, types from every row
///
/// The first `id`/`shortId`/`hashId` column is the primary key; without one a
/// surrogate autoincrement `id` leads. The owner column always closes the list.
pub fn table_layout(name: &str, rows: &[Row]) -> TableLayout {
    let Some(first) = rows.first() else {
        return TableLayout {
            name: name.to_string(),
            source: Some(name.to_string()),
            columns: vec![ColumnDef::surrogate(), ColumnDef::owner()],
            references_video_hash: false,
        };
    };

    report_divergent_rows(name, rows);

    let natural_key = first.keys().find(|k| NATURAL_KEYS.contains(&k.as_str()));
    let mut taken = match natural_key {
        Some(key) => reserved_names(&[OWNER_COLUMN, key.as_str()]),
        None => reserved_names(&[OWNER_COLUMN, SURROGATE_COLUMN]),
    };

    let mut columns = Vec::with_capacity(first.len() + 2);
    if natural_key.is_none() {
        columns.push(ColumnDef::surrogate());
    }
    for key in first.keys() {
        if Some(key) == natural_key {
            columns.push(ColumnDef {
                name: key.clone(),
                key: Some(key.clone()),
                sql_type: column_type(rows, key),
                role: ColumnRole::PrimaryKey,
            });
        } else {
            columns.push(ColumnDef::data(key, column_type(rows, key), ColumnRole::Data, &mut taken));
        }
    }
    columns.push(ColumnDef::owner());

    TableLayout {
        name: name.to_string(),
        source: Some(name.to_string()),
        columns,
        references_video_hash: first.contains_key("shortId"),
    }
}

/// Layouts for every table, in DDL order: users, video_hash, then the rest
pub fn layouts(data: &SqlData) -> Vec<TableLayout> {
    let profile = data.data.get("profile").unwrap_or(&[]);
    let mut layouts = vec![users_layout(profile), video_hash_layout()];
    layouts.extend(
        data.data
            .iter()
            .filter(|table| table.name != "profile")
            .map(|table| table_layout(&table.name, &table.rows)),
    );
    layouts
}

fn reserved_names(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_ascii_lowercase()).collect()
}

fn column_type(rows: &[Row], key: &str) -> SqlType {
    let mut builder = ColumnTypeBuilder::default();
    for value in rows.iter().filter_map(|row| row.get(key)) {
        builder.add_value(value);
    }
    builder.build()
}

fn report_divergent_rows(table: &str, rows: &[Row]) {
    let Some((first, rest)) = rows.split_first() else {
        return;
    };
    let divergent = rest
        .iter()
        .filter(|row| row.len() != first.len() || !row.keys().all(|k| first.contains_key(k)))
        .count();
    if divergent > 0 {
        warn!(table, divergent, "Rows differ in shape from the first row; extra keys are dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::types::wrap_row;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values.into_iter().map(wrap_row).collect()
    }

    fn names(layout: &TableLayout) -> Vec<&str> {
        layout.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_sql_type_of_value() {
        assert_eq!(SqlType::of_value(&json!(null)), None);
        assert_eq!(SqlType::of_value(&json!(3)), Some(SqlType::Integer));
        assert_eq!(SqlType::of_value(&json!(3.0)), Some(SqlType::Integer));
        assert_eq!(SqlType::of_value(&json!(3.5)), Some(SqlType::Real));
        assert_eq!(SqlType::of_value(&json!(true)), Some(SqlType::Integer));
        assert_eq!(SqlType::of_value(&json!("3")), Some(SqlType::Text));
        assert_eq!(SqlType::of_value(&json!([1])), Some(SqlType::Text));
    }

    #[test]
    fn test_types_unify_across_rows() {
        let rows = rows(vec![
            json!({"a": null, "b": 1, "c": 1, "d": null}),
            json!({"a": 5, "b": 2.5, "c": "x", "d": null}),
        ]);
        let layout = table_layout("t", &rows);
        let types: Vec<SqlType> = layout.columns.iter().map(|c| c.sql_type).collect();
        assert_eq!(
            types,
            vec![
                SqlType::Integer,
                SqlType::Integer,
                SqlType::Real,
                SqlType::Text,
                SqlType::Text,
                SqlType::Text
            ]
        );
    }

    #[test]
    fn test_natural_key_and_video_hash_reference() {
        let layout = table_layout("posts", &rows(vec![json!({"Date": "d", "shortId": "abc"})]));
        assert_eq!(names(&layout), vec!["Date", "shortId", "userName"]);
        assert_eq!(layout.columns[1].role, ColumnRole::PrimaryKey);
        assert!(layout.references_video_hash);
    }

    #[test]
    fn test_surrogate_key_and_stub() {
        let layout = table_layout("searches", &rows(vec![json!({"Date": "d"})]));
        assert_eq!(names(&layout), vec!["id", "Date", "userName"]);
        assert_eq!(layout.columns[0].role, ColumnRole::Surrogate);

        let stub = table_layout("reposts", &[]);
        assert_eq!(names(&stub), vec!["id", "userName"]);
        assert!(!stub.references_video_hash);
    }

    #[test]
    fn test_owner_clash_is_renamed() {
        let layout = table_layout("friends", &rows(vec![json!({"UserName": "bob", "Id": 4})]));
        assert_eq!(names(&layout), vec!["id", "UserName_value", "Id_value", "userName"]);
        assert_eq!(layout.columns[1].key.as_deref(), Some("UserName"));
    }

    #[test]
    fn test_case_insensitive_duplicates_are_renamed() {
        let layout = table_layout(
            "items",
            &rows(vec![json!({"id": "a", "Id": "b", "Date": 1, "date": 2})]),
        );
        assert_eq!(names(&layout), vec!["id", "Id_value", "Date", "date_value", "userName"]);
        assert_eq!(layout.columns[3].key.as_deref(), Some("date"));

        let layout = table_layout("t", &rows(vec![json!({"a": 1, "A": 2, "A_value": 3})]));
        assert_eq!(names(&layout), vec!["id", "a", "A_value", "A_value_value", "userName"]);
    }

    #[test]
    fn test_users_layout() {
        let layout = users_layout(&rows(vec![json!({"displayName": "A", "userName": "a", "age": 30})]));
        assert_eq!(names(&layout), vec!["userName", "displayName", "age"]);
        assert_eq!(layout.columns[0].role, ColumnRole::PrimaryKey);
        assert_eq!(layout.columns[2].sql_type, SqlType::Integer);

        assert_eq!(names(&users_layout(&[])), vec!["userName"]);
    }
}
