//! # Crucible - Social Archive Normalizer
//!
//! Turns a TikTok-style personal data export (one deeply nested JSON document
//! with space-containing keys) into flat relational tables, then into SQLite
//! DDL and bulk INSERT scripts.
//!
//! ## Modules
//!
//! - **path** / **paths**: logical path resolution and the export's path dictionary
//! - **melt**: per-section extractors and the normalized table mapping
//! - **schema**: table layouts, `CREATE TABLE` and `INSERT` generation
//! - **classify**: content classification of a single field
//! - **session**: a loaded archive with stats, path probing and extraction
//!
//! ## Quick Start
//!
//! ### Archive to SQL
//!
//! ```rust
//! use crucible::melt::{ExtractMode, MeltConfig};
//! use crucible::schema::{generate_inserts, generate_schema};
//! use serde_json::json;
//!
//! let archive = json!({
//!     "Profile And Settings": {"Profile Info": {"ProfileMap": {"userName": "alice"}}},
//!     "Your Activity": {"Searches": {"SearchList": [
//!         {"Date": "2024-01-01 10:00:00", "SearchTerm": "rust"}
//!     ]}}
//! });
//!
//! let data = crucible::extract(&archive, ExtractMode::Full, &MeltConfig::default());
//! assert_eq!(data.user_name.as_deref(), Some("alice"));
//! assert_eq!(data.data.get("searches").unwrap().len(), 1);
//!
//! let ddl = generate_schema(&data);
//! let dml = generate_inserts(&data, false);
//! assert!(ddl.contains("CREATE TABLE IF NOT EXISTS \"searches\""));
//! assert!(dml.contains("'rust'"));
//! ```
//!
//! ### Field Classification
//!
//! ```rust
//! use crucible::classify::{classify, FieldKind};
//!
//! assert_eq!(classify("https://example.com/v/1"), Some(FieldKind::Url));
//! assert_eq!(classify("42"), Some(FieldKind::Number));
//! assert_eq!(classify("notes.txt"), Some(FieldKind::FilePath));
//! ```

use serde_json::Value;

pub mod classify;
pub mod error;
pub mod logging;
pub mod melt;
pub mod path;
pub mod paths;
pub mod schema;
pub mod session;
pub mod text;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types for convenience
pub use error::{MeltError, Result};
pub use melt::{ExtractMode, MeltConfig, Section, SqlData, SqlDataAssembler};
pub use path::LogicalPath;
pub use paths::ArchivePaths;
pub use schema::{generate_inserts, generate_schema};
pub use session::{ArchiveStats, FileInfo, PathProbe, Session};

/// Main entry point: normalize a parsed archive into the table mapping
pub fn extract(archive: &Value, mode: ExtractMode, config: &MeltConfig) -> SqlData {
    SqlDataAssembler::new(archive, config).assemble(mode)
}

/// Sections whose source paths exist in `archive`
pub fn list_present_sections(archive: &Value, config: &MeltConfig) -> Vec<Section> {
    melt::SectionExtractor::new(archive, config).present_sections()
}
