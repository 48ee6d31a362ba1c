//! crucible-sql: Generate SQLite DDL and INSERT scripts
//!
//! Usage:
//!   # Schema for a full extraction, to stdout
//!   crucible-sql --schema user_data.json
//!
//!   # Both scripts from a previously exported mapping
//!   crucible-sql --normalized tiktok_alice_full.json --output-dir ./sql

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crucible::logging::init_logging;
use crucible::melt::{ExportWriter, ExtractMode, MeltConfig};
use crucible::session::parse_archive;
use crucible::{Session, SqlData};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crucible-sql")]
#[command(about = "Generate SQLite DDL and INSERT scripts from a social archive", long_about = None)]
struct Args {
    /// Archive file
    #[arg(value_name = "FILE", required_unless_present = "normalized")]
    input: Option<PathBuf>,

    /// Read an exported normalized mapping instead of an archive
    #[arg(long, value_name = "FILE", conflicts_with = "input")]
    normalized: Option<PathBuf>,

    /// Emit the CREATE TABLE script
    #[arg(long)]
    schema: bool,

    /// Emit the INSERT script
    #[arg(long)]
    inserts: bool,

    /// Write surrogate `id` columns as row numbers
    #[arg(long)]
    include_id: bool,

    /// Extract a preview instead of every row
    #[arg(long)]
    preview: bool,

    /// Write <user>_schema.sql / tiktok_insert_<user>.sql here instead of stdout
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// JSON file overriding extraction settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON file overriding archive paths
    #[arg(long, value_name = "FILE")]
    paths: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (default: warn)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    // Neither flag means both scripts
    let (want_schema, want_inserts) = match (args.schema, args.inserts) {
        (false, false) => (true, true),
        flags => flags,
    };

    let config = MeltConfig::from_files(args.config.as_deref(), args.paths.as_deref())
        .context("Failed to load configuration")?;
    let mut session = Session::new(config);

    if let Some(path) = &args.normalized {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let data = SqlData::from_value(parse_archive(&bytes)?)?;
        session.set_normalized(data);
    } else if let Some(path) = &args.input {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        session.load(&path.display().to_string(), &bytes)?;
        let mode = if args.preview {
            ExtractMode::Preview
        } else {
            ExtractMode::Full
        };
        session.extract(mode)?;
    } else {
        bail!("An archive FILE or --normalized FILE is required");
    }

    let user_name = session.last().and_then(|data| data.user_name.clone());
    let schema = if want_schema { Some(session.schema()?) } else { None };
    let inserts = if want_inserts {
        Some(session.inserts(args.include_id)?)
    } else {
        None
    };

    match &args.output_dir {
        Some(dir) => {
            let writer = ExportWriter::new(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            if let Some(ddl) = &schema {
                writer.write_schema(user_name.as_deref(), ddl)?;
            }
            if let Some(dml) = &inserts {
                writer.write_inserts(user_name.as_deref(), dml)?;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if let Some(ddl) = &schema {
                writeln!(out, "{}\n", ddl)?;
            }
            if let Some(dml) = &inserts {
                write!(out, "{}", dml)?;
            }
        }
    }

    Ok(())
}
