//! crucible-field: Classify the contents of one field of one table
//!
//! Usage:
//!   crucible-field --table messages --field Content user_data.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use crucible::logging::init_logging;
use crucible::melt::{ExtractMode, MeltConfig};
use crucible::Session;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crucible-field")]
#[command(about = "Classify field contents: url, boolean, number, emoji, file path, long text, string", long_about = None)]
struct Args {
    /// Archive file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Table name in the normalized mapping, e.g. `comments`
    #[arg(long, short = 't')]
    table: String,

    /// Column to classify, e.g. `comment`
    #[arg(long, short = 'f')]
    field: String,

    /// Classify only the preview rows
    #[arg(long)]
    preview: bool,

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

    let config = MeltConfig::from_files(None, args.paths.as_deref())
        .context("Failed to load configuration")?;
    let mut session = Session::new(config);

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    session.load(&args.input.display().to_string(), &bytes)?;

    let mode = if args.preview {
        ExtractMode::Preview
    } else {
        ExtractMode::Full
    };
    let rows = session.extract(mode)?.data.get(&args.table).map_or(0, <[_]>::len);
    let counts = session.classify_field(&args.table, &args.field)?;

    let report = json!({
        "table": args.table,
        "field": args.field,
        "rows": rows,
        "classified": counts.total(),
        "counts": counts,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
