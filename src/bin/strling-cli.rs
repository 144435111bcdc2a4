//! STRling CLI - Command-Line Interface for Parser Diagnostics and Emission
//!
//! The binding-agnostic communication layer between editors/LSP servers and
//! the Rust core. `diagnostics` emits JSON-formatted, LSP-compatible
//! diagnostics; `emit` runs the full pipeline and prints the target
//! pattern.
//!
//! # Usage
//!
//! ```bash
//! strling-cli diagnostics <filepath>
//! strling-cli diagnostics --stdin
//! strling-cli emit --target pcre2 <filepath>
//! ```
//!
//! # Diagnostics output
//!
//! ```json
//! {
//!     "success": false,
//!     "diagnostics": [ { "range": {...}, "severity": 1, "message": "...",
//!                        "source": "STRling", "code": "..." } ],
//!     "version": "3.0.0-alpha"
//! }
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use strling_core::{compile, emit_pcre2, parse};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run diagnostics on a file or stdin
    Diagnostics {
        /// Input file path (omit for stdin)
        file: Option<PathBuf>,

        /// Read from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },

    /// Emit compiled output in the target dialect
    Emit {
        /// Target dialect
        #[arg(long, default_value = "pcre2")]
        target: String,

        /// Input file path (omit for stdin)
        file: Option<PathBuf>,

        /// Read from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading input: {0}")]
    Io(#[from] io::Error),
    #[error("Unsupported emit target: {0}")]
    UnknownTarget(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Diagnostics { file, stdin } => {
            let text = read_input(file, stdin)?;
            let report = diagnostics_report(&text);
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Emit {
            target,
            file,
            stdin,
        } => {
            if !target.eq_ignore_ascii_case("pcre2") {
                return Err(CliError::UnknownTarget(target));
            }
            let text = read_input(file, stdin)?;
            match run_pipeline(&text) {
                Ok(pattern) => {
                    println!("{}", pattern);
                    Ok(ExitCode::SUCCESS)
                }
                Err(diag) => {
                    eprintln!("{}", diag);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn run_pipeline(text: &str) -> Result<String, strling_core::STRlingError> {
    let (flags, ast) = parse(text)?;
    let ir = compile(&ast)?;
    Ok(emit_pcre2(&ir, &flags))
}

fn diagnostics_report(text: &str) -> serde_json::Value {
    let result = parse(text).and_then(|(_, ast)| compile(&ast));
    let diagnostics = match &result {
        Ok(_) => vec![],
        Err(diag) => vec![diag.to_lsp_diagnostic()],
    };
    serde_json::json!({
        "success": result.is_ok(),
        "diagnostics": diagnostics,
        "version": env!("CARGO_PKG_VERSION"),
    })
}

fn read_input(file: Option<PathBuf>, stdin: bool) -> Result<String, CliError> {
    match file {
        Some(path) if !stdin => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
