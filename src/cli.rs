//! Command-line interface for the Cicode grammar tools.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cicode")]
#[command(about = "Cicode grammar loader, parser and checker", long_about = None)]
pub struct Cli {
    /// Log filter such as `debug` or `cicode_ast=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the embedded grammar loads and print its summary
    Verify,
    /// Parse a file and print its syntax tree
    Parse {
        file: PathBuf,
        /// Only report syntax errors
        #[arg(short, long)]
        quiet: bool,
    },
    /// Parse and validate files, reporting diagnostics
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the functions defined in a file
    Symbols {
        file: PathBuf,
        /// Print the symbols as JSON
        #[arg(long)]
        json: bool,
    },
}
