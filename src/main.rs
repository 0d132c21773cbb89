//! varguard - custom property fallback checker

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use varguard::{Correction, Options, Persist, PropertyTable, Validator};

#[derive(Parser)]
#[command(name = "varguard")]
#[command(version, about = "Check CSS custom property fallbacks", long_about = None)]
#[command(after_help = "EXAMPLES:
    varguard -p tokens.json app.css           Report wrong fallbacks
    varguard -p tokens.json -w src/*.css      Fix wrong fallbacks in place
    varguard -p tokens.json --json app.css    Report as JSON")]
struct Cli {
    /// JSON object mapping custom property names to canonical values
    #[arg(short, long, value_name = "FILE")]
    properties: PathBuf,

    /// Stylesheets to check
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Rewrite stylesheets with corrected fallbacks
    #[arg(short, long)]
    write: bool,

    /// Print corrections as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match check(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Corrections and per-file failures of a whole invocation.
#[derive(Debug, Default)]
struct Report {
    corrections: Vec<Correction>,
    failures: Vec<(PathBuf, varguard::Error)>,
}

fn check(cli: &Cli) -> varguard::Result<ExitCode> {
    let properties = PropertyTable::from_json_file(&cli.properties)?;
    let mut validator = Validator::new(Options::new(properties).write(cli.write))?;
    let report = check_files(&mut validator, &cli.inputs);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.corrections)?);
    } else if !cli.quiet {
        for correction in &report.corrections {
            println!("{correction}");
        }
        if cli.write && !report.corrections.is_empty() {
            println!("Fixed {} fallback(s)", report.corrections.len());
        }
    }

    for (path, err) in &report.failures {
        eprintln!("error: {}: {err}", path.display());
    }

    Ok(if !report.failures.is_empty() {
        ExitCode::from(2)
    } else if cli.write || report.corrections.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Validate every input; a file that fails does not stop the others.
fn check_files<P: Persist>(validator: &mut Validator<P>, inputs: &[PathBuf]) -> Report {
    let mut report = Report::default();

    for input in inputs {
        let css = match std::fs::read_to_string(input) {
            Ok(css) => css,
            Err(err) => {
                report.failures.push((input.clone(), err.into()));
                continue;
            }
        };
        let result = validator.process(&css, Some(input.clone()));
        report.corrections.extend(result.corrections);
        if let Some(err) = result.persist_error {
            report.failures.push((input.clone(), err));
        }
    }

    report
}
