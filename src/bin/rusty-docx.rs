use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rusty_docx::render::{self, Report};
use rusty_docx::{Extraction, Session, SessionStatus};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "rusty-docx",
    version,
    about = "Extract the last table of Word documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the last table of each document.
    Extract(ExtractArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned text grid preceded by the file name.
    Grid,
    /// Headers and rows as CSV.
    Csv,
    /// One JSON object per document and line.
    Json,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input .docx paths or glob patterns.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Keep the first row as data and name columns Column_1, Column_2, ...
    #[arg(long)]
    no_header: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Grid)]
    format: Format,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Write to this file instead of stdout (single input only).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Expands input paths and glob patterns in command-line order.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if Path::new(input).exists() {
            paths.push(PathBuf::from(input));
            continue;
        }
        let matches = glob::glob(input)
            .with_context(|| format!("invalid input pattern '{input}'"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("failed to expand '{input}'"))?;
        if matches.is_empty() {
            bail!("no file matches '{input}'");
        }
        paths.extend(matches);
    }
    Ok(paths)
}

/// Renders one processed document in the selected format.
fn render_session(session: &Session, args: &ExtractArgs) -> Result<String> {
    Ok(match args.format {
        Format::Grid => render::text(session),
        Format::Json => {
            let mut line = Report::new(session).to_json()?;
            line.push('\n');
            line
        }
        Format::Csv => match session.outcome().and_then(Extraction::table) {
            Some(table) => render::csv(table, args.delimiter as u8)?,
            None => {
                let name = session.document_name().unwrap_or_default();
                let message = session.status().message().unwrap_or_default();
                eprintln!("warning: {name}: {message}");
                String::new()
            }
        },
    })
}

/// Processes every input; returns true when each produced a non-empty table.
fn run_extract(args: &ExtractArgs) -> Result<bool> {
    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character");
    }
    let paths = expand_inputs(&args.inputs)?;
    if args.output.is_some() && paths.len() > 1 {
        bail!("--output needs a single input, got {} files", paths.len());
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let use_first_row_as_header = !args.no_header;
    let mut session = Session::new();
    let mut complete = true;
    for path in &paths {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let name = path.display().to_string();
        session.upload(name, bytes);
        if session.needs_refresh(use_first_row_as_header) {
            session.refresh(use_first_row_as_header);
        }
        debug!(file = %path.display(), status = ?session.status().kind(), "processed document");

        complete &= matches!(session.status(), SessionStatus::Table(_));
        let output = render_session(&session, args)?;
        writer
            .write_all(output.as_bytes())
            .context("failed to write output")?;
        session.reset();
    }
    writer.flush().context("failed to write output")?;
    Ok(complete)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Extract(args) = &cli.command;

    let default_filter = if args.verbose { "rusty_docx=debug" } else { "rusty_docx=warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_extract(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
