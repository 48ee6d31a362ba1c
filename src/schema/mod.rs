//! Relational output for the normalized mapping
//!
//! `layout` derives one table layout per table; `builder` renders it as DDL
//! and `inserts` as bulk DML.

pub mod builder;
pub mod inserts;
pub mod layout;

pub use builder::generate_schema;
pub use inserts::{escape_value, generate_inserts};
pub use layout::{layouts, ColumnDef, ColumnRole, SqlType, TableLayout};
