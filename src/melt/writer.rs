use crate::error::Result;
use crate::melt::types::{SqlData, Tables};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes export artifacts into one output directory
pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    /// Create the writer, creating `output_dir` if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;
        Ok(ExportWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Pretty JSON of the whole normalized mapping
    pub fn write_sql_data(&self, data: &SqlData) -> Result<PathBuf> {
        let suffix = if data.is_full { "full" } else { "truncated" };
        let name = format!(
            "tiktok_{}_{}.json",
            data.user_name.as_deref().unwrap_or("data"),
            suffix
        );
        let path = self.output_dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;
        info!(path = %path.display(), "Wrote normalized mapping");
        Ok(path)
    }

    pub fn write_schema(&self, user_name: Option<&str>, ddl: &str) -> Result<PathBuf> {
        let name = format!("{}_schema.sql", user_slug(user_name));
        self.write_text(&name, ddl)
    }

    pub fn write_inserts(&self, user_name: Option<&str>, dml: &str) -> Result<PathBuf> {
        let name = format!("tiktok_insert_{}.sql", user_slug(user_name));
        self.write_text(&name, dml)
    }

    /// One `<table>.jsonl` file per non-empty table
    pub fn write_tables_jsonl(&self, tables: &Tables) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for table in tables.iter().filter(|t| !t.rows.is_empty()) {
            let path = self.output_dir.join(format!("{}.jsonl", table.name));
            let mut writer = BufWriter::new(File::create(&path)?);
            for row in &table.rows {
                serde_json::to_writer(&mut writer, row)?;
                writeln!(writer)?;
            }
            writer.flush()?;
            written.push(path);
        }
        info!(files = written.len(), "Wrote per-table JSON Lines");
        Ok(written)
    }

    fn write_text(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        std::fs::write(&path, text)?;
        info!(path = %path.display(), bytes = text.len(), "Wrote SQL script");
        Ok(path)
    }
}

/// A single JSON Lines stream with the table name attached to each row
pub struct RowStreamWriter<W: Write> {
    writer: W,
}

impl<W: Write> RowStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        RowStreamWriter { writer }
    }

    pub fn write_tables(&mut self, tables: &Tables) -> Result<()> {
        for table in tables.iter() {
            for row in &table.rows {
                let mut data = row.clone();
                data.insert(
                    "_table".to_string(),
                    serde_json::Value::String(table.name.clone()),
                );
                serde_json::to_writer(&mut self.writer, &data)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

/// User name as used in file names: `@` stripped, `tiktok` when unknown
pub fn user_slug(user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.is_empty() => name.replacen('@', "", 1),
        _ => "tiktok".to_string(),
    }
}
