//! Archive melting - reshape the nested export into flat, relational tables
//!
//! Each archive section has an extractor that projects an explicit allow-list
//! of fields per record. The assembler runs them all and produces the
//! normalized table-name → rows mapping in preview or full mode.

pub mod assembler;
pub mod extractor;
pub mod types;
pub mod writer;

pub use assembler::{balanced_preview, dedup_video_hash, SqlDataAssembler};
pub use extractor::SectionExtractor;
pub use types::{
    ChatKind, ExtractMode, MeltConfig, MessageRow, Row, Section, SqlData, Table, Tables,
    VideoHashEntry,
};
pub use writer::{user_slug, ExportWriter, RowStreamWriter};
