use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsa_throughput_engine::{
    DEFAULT_HEADER_LOOKAHEAD, ExtractOptions, ExtractionReport, HeaderRegistry, PageSelection,
    extract_json_to_csv, extract_json_to_json,
};

#[derive(Debug, Parser)]
#[command(
    name = "tsa2csv",
    version,
    about = "Normalize recognized TSA throughput tables into records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract throughput records from a recognized-document JSON file.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Recognized document JSON path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path (CSV unless --json is given).
    #[arg(short, long)]
    output: PathBuf,

    /// Page selection like 1-2 or 1,3-4.
    #[arg(long)]
    pages: Option<String>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Number of leading rows scanned for a header.
    #[arg(long, default_value_t = DEFAULT_HEADER_LOOKAHEAD)]
    lookahead: usize,

    /// Header registry JSON replacing the built-in layouts.
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Write the full extraction result as JSON instead of CSV.
    #[arg(long)]
    json: bool,

    /// Drop page, table and row columns from CSV output.
    #[arg(long)]
    no_provenance: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn load_registry(path: Option<&PathBuf>) -> Result<HeaderRegistry> {
    let Some(path) = path else {
        return Ok(HeaderRegistry::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry '{}'", path.display()))?;
    HeaderRegistry::from_json_str(&json)
        .with_context(|| format!("failed to load registry '{}'", path.display()))
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    Ok(ExtractOptions {
        pages,
        header_lookahead: args.lookahead,
        registry: load_registry(args.registry.as_ref())?,
        delimiter: args.delimiter as u8,
        no_provenance: args.no_provenance,
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} table={:?} row={:?} field={:?}: {}",
                warning.code,
                warning.page,
                warning.table,
                warning.row,
                warning.field,
                warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let extracted = if args.json {
        extract_json_to_json(&args.input, &args.output, &options)
    } else {
        extract_json_to_csv(&args.input, &args.output, &options)
    };

    extracted.map_err(|error| {
        let warnings = error.warnings().len();
        anyhow!(error).context(format!(
            "failed to extract records from '{}' ({warnings} warning(s) before failure)",
            args.input.display()
        ))
    })
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tsa_throughput_engine=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.record_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
