use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hexfilter_core::{DialectKind, HexFilter, filter_stream};

mod config;

use config::FileConfig;

/// Hexfilter - extract hex dumps from kernel and application logs
#[derive(Parser, Debug)]
#[command(name = "hexfilter")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input (log) file to filter; stdin when omitted
    #[arg(short, long, value_name = "PATH")]
    input_file: Option<PathBuf>,

    /// Filtered output file; stdout when omitted
    #[arg(short, long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Skip the timestamp column in the output
    #[arg(short, long)]
    skip_timestamps: bool,

    /// Print absolute timestamps instead of deltas
    #[arg(short, long)]
    abs_timestamps: bool,

    /// Round timestamp deltas to this many microseconds
    #[arg(short, long, value_name = "MICROS")]
    rounding: Option<u64>,

    /// The log has no timestamps at all
    #[arg(short = 't', long)]
    no_timestamps: bool,

    /// Only keep records whose description starts with a match (repeatable)
    #[arg(short = 'd', long, value_name = "REGEX")]
    desc_str: Vec<String>,

    /// Drop records whose description starts with a match (repeatable)
    #[arg(short = 'I', long, value_name = "REGEX")]
    desc_str_invert: Vec<String>,

    /// Keep the description in the output
    #[arg(short, long)]
    keep_desc_str: bool,

    /// Print up to N non-dump lines preceding each record
    #[arg(short = 'b', long, value_name = "N")]
    keep_non_hex_before: Option<usize>,

    /// Omit the ASCII column
    #[arg(short = 'x', long)]
    skip_ascii: bool,

    /// Hex dump dialect (linux, generic)
    #[arg(short = 'D', long)]
    dialect: Option<DialectKind>,

    /// TOML config file with default options
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase diagnostic output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Diagnostics go to stderr so they never mix with filtered output
    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = file_config.merge(&args);
    let mut filter = HexFilter::new(config).context("invalid filter configuration")?;

    let reader: Box<dyn BufRead> = match &args.input_file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = filter_stream(&mut filter, reader, writer)?;
    let stats = filter.stats();
    info!(
        lines = summary.lines_read,
        records = summary.records_written,
        filtered = stats.filtered,
        rejected = stats.rejected,
        "done"
    );

    Ok(())
}

/// Closing the output early (e.g. piping into `head`) is not an error
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let io_err = match cause.downcast_ref::<hexfilter_core::Error>() {
            Some(hexfilter_core::Error::Io(e)) => Some(e),
            _ => cause.downcast_ref::<io::Error>(),
        };
        io_err.is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
