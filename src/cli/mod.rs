//! The mdxalchemy Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. Results go to stdout, logs and diagnostics to
//! stderr.

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::args::{Command, MdxArgs};
use crate::config::AnalyzerConfig;
use crate::diagnostics::MdxError;
use crate::engine::{print_error, read_file, GrammarEngine};
use crate::export;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = MdxArgs::parse();
    setup_logging(args.verbose);

    match execute(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            print_error(error);
            process::exit(1);
        }
    }
}

/// Runs one subcommand. `Ok(false)` means the command ran but reported a
/// failure (a `check` mismatch).
pub fn execute(args: &MdxArgs) -> Result<bool, MdxError> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    let engine = GrammarEngine::new(config);

    match &args.command {
        Command::Analyze { file } => {
            let statement = analyze_file(&engine, file)?;
            output::print_text(&export::to_json_string(&statement)?);
        }
        Command::Export { file, output } => {
            let statement = analyze_file(&engine, file)?;
            export::export_to_file(output, &statement)?;
            info!(output = %output.display(), "wrote analysis");
        }
        Command::Transform { file } => {
            let cst = engine.parse_file(file)?;
            output::print_text(&engine.transform_cst(&cst)?.to_mdx());
        }
        Command::Cst { file } => {
            let cst = engine.parse_file(file)?;
            print!("{cst}");
        }
        Command::Check { file, expected } => return check(&engine, file, expected),
    }
    Ok(true)
}

fn analyze_file(engine: &GrammarEngine, file: &Path) -> Result<crate::ast::QueryStatement, MdxError> {
    let cst = engine.parse_file(file)?;
    engine.analyze_cst(&cst)
}

fn check(engine: &GrammarEngine, file: &Path, expected: &Path) -> Result<bool, MdxError> {
    let statement = analyze_file(engine, file)?;
    let actual = export::to_json_value(&statement)?;
    let expected_value: serde_json::Value =
        serde_json::from_str(&read_file(expected)?).map_err(|e| {
            MdxError::io(
                format!("'{}' is not valid JSON", expected.display()),
                e.into(),
            )
        })?;

    let name = file.display().to_string();
    if actual == expected_value {
        output::print_success(&format!("ok: {name}"));
        return Ok(true);
    }
    output::print_mismatch(
        &name,
        &export::to_pretty_string(&expected_value)?,
        &export::to_pretty_string(&actual)?,
    );
    Ok(false)
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mdxalchemy={level}")));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // A subscriber may already be installed when the CLI is driven in-process.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
