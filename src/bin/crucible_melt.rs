//! crucible-melt: Normalize a social archive export into flat tables
//!
//! Usage:
//!   # Preview (first rows of each table) to stdout
//!   crucible-melt user_data.json
//!
//!   # Full export written as tiktok_<user>_full.json
//!   crucible-melt --full user_data.json --output-dir ./out
//!
//!   # One JSON Lines file per table
//!   crucible-melt --full --jsonl user_data.json --output-dir ./out
//!
//!   # Inspect the archive instead of extracting
//!   crucible-melt --stats user_data.json
//!   crucible-melt --sections user_data.json
//!   crucible-melt --probe "Your Activity.Searches.SearchList" user_data.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use crucible::logging::init_logging;
use crucible::melt::{ExportWriter, ExtractMode, MeltConfig, RowStreamWriter};
use crucible::Session;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crucible-melt")]
#[command(about = "Normalize a social archive export into flat tables", long_about = None)]
struct Args {
    /// Archive file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Emit every row instead of a per-table preview
    #[arg(long)]
    full: bool,

    /// Directory for exported files; stdout if omitted
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Write JSON Lines (one file per table, or one tagged stream on stdout)
    #[arg(long)]
    jsonl: bool,

    /// List the sections present in the archive and exit
    #[arg(long, conflicts_with_all = ["stats", "probe"])]
    sections: bool,

    /// Print archive statistics and exit
    #[arg(long, conflicts_with = "probe")]
    stats: bool,

    /// Resolve one dotted path and print its value
    #[arg(long, value_name = "PATH")]
    probe: Option<String>,

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

    let config = MeltConfig::from_files(args.config.as_deref(), args.paths.as_deref())
        .context("Failed to load configuration")?;
    let mut session = Session::new(config);

    let (name, bytes) = read_input(args.input.as_ref())?;
    session.load(&name, &bytes)?;

    if args.sections {
        let names: Vec<&str> = session
            .present_sections()?
            .into_iter()
            .map(|section| section.table_name())
            .collect();
        return print_json(&names);
    }
    if args.stats {
        return print_json(&session.stats()?);
    }
    if let Some(path) = &args.probe {
        return print_json(&session.probe(path)?);
    }

    let mode = if args.full {
        ExtractMode::Full
    } else {
        ExtractMode::Preview
    };
    let data = session.extract(mode)?;

    match &args.output_dir {
        Some(dir) => {
            let writer = ExportWriter::new(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            if args.jsonl {
                writer.write_tables_jsonl(&data.data)?;
            } else {
                writer.write_sql_data(data)?;
            }
        }
        None if args.jsonl => {
            let stdout = std::io::stdout();
            let mut writer = RowStreamWriter::new(stdout.lock());
            writer.write_tables(&data.data)?;
            writer.flush()?;
        }
        None => print_json(data)?,
    }

    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> Result<(String, Vec<u8>)> {
    match input {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((name, bytes))
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read stdin")?;
            Ok(("stdin".to_string(), bytes))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
