//! CLI module for the Codon scanner
//!
//! ## Commands
//!
//! - `tokens <file>` - Print the token stream
//! - `check <file>` - Report lexical errors
//! - `state <file>` - Print the scanner state recorded before each token
//! - `reparse <file>` - Apply an edit incrementally and verify it against a full scan
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use codon_syntax::session::SessionConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Inspect how the Codon external scanner tokenizes a file
#[derive(Parser, Debug)]
#[command(name = "codon-scan")]
#[command(version = VERSION)]
#[command(about = "Inspect how the Codon external scanner tokenizes a file", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Decorator that marks an opaque extern body (repeatable; default: llvm, python)
    #[arg(long = "extern", value_name = "NAME", global = true)]
    pub extern_decorators: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream
    Tokens {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
        /// Include tokens from the built-in lexer, not just external ones
        #[arg(long)]
        all: bool,
    },

    /// Report lexical errors with source context
    Check {
        /// Source file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the decoded scanner state recorded before each token
    State {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Apply an edit incrementally and verify the result against a full scan
    Reparse {
        /// Source file to edit (the file itself is not modified)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Byte offset where the edit starts
        #[arg(long, value_name = "BYTE")]
        at: usize,
        /// Number of bytes to delete
        #[arg(long, value_name = "N", default_value_t = 0)]
        delete: usize,
        /// Text to insert (escape sequences \n, \t and \\ are expanded)
        #[arg(long, value_name = "TEXT", default_value = "")]
        insert: String,
    },
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        if self.extern_decorators.is_empty() {
            SessionConfig::default()
        } else {
            SessionConfig::new().with_extern_decorators(self.extern_decorators.iter().cloned())
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.session_config();
    match cli.command {
        Command::Tokens { file, json, all } => commands::tokens(&file, json, all, &config),
        Command::Check { file } => commands::check(&file, &config),
        Command::State { file } => commands::state(&file, &config),
        Command::Reparse {
            file,
            at,
            delete,
            insert,
        } => commands::reparse(&file, at, delete, &insert, &config),
    }
}

// ============================================================================
// Tests
// ============================================================================
