//! `cicode` CLI entry point.

mod cli;

use std::error::Error;
use std::path::Path;

use cicode::diagnostics::print_diagnostic;
use cicode::pipeline::check_with_diagnostics;
use cicode::symbols::function_symbols;
use cicode::{CicodeDatabaseImpl, Db, DiagnosticSeverity};
use cicode_core::LineIndex;
use clap::Parser as _;
use cli::{Cli, Command};
use ropey::Rope;
use tracing_subscriber::EnvFilter;

type CliResult = Result<bool, Box<dyn Error + Send + Sync>>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Command::Verify => verify(),
        Command::Parse { file, quiet } => parse_file(&file, quiet),
        Command::Check { files } => check_files(&files),
        Command::Symbols { file, json } => list_symbols(&file, json),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// `--log-level` wins over `RUST_LOG`; the default only shows warnings.
fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &Path) -> Result<Rope, Box<dyn Error + Send + Sync>> {
    let file = std::fs::File::open(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(Rope::from_reader(file)?)
}

fn verify() -> CliResult {
    let language = cicode::verify_language_loads()?;
    println!("Loaded grammar `{}`", language.name().unwrap_or("cicode"));
    println!("  ABI version: {}", language.abi_version());
    println!("  node kinds:  {}", language.node_kind_count());
    println!("  fields:      {}", language.field_count());
    Ok(true)
}

fn parse_file(path: &Path, quiet: bool) -> CliResult {
    let text = read_source(path)?.to_string();
    let mut parser = cicode::new_parser()?;
    let tree = parser
        .parse(&text, None)
        .ok_or_else(|| format!("failed to parse {}", path.display()))?;

    if !quiet {
        println!("{}", cicode::to_sexp(tree.root_node()));
    }

    let errors = cicode::syntax_errors(tree.root_node(), &text);
    for error in &errors {
        eprintln!(
            "{}:{}:{}: {}",
            path.display(),
            error.start.row + 1,
            error.start.column + 1,
            error.message
        );
    }
    Ok(errors.is_empty())
}

fn check_files(paths: &[std::path::PathBuf]) -> CliResult {
    let db = CicodeDatabaseImpl::default();
    let mut errors = 0;
    let mut warnings = 0;

    for path in paths {
        let source = db.input(path.clone())?;
        let result = check_with_diagnostics(&db, source);
        let rope = Rope::from_str(source.text(&db));
        let name = path.display().to_string();
        for diagnostic in &result.diagnostics {
            print_diagnostic(diagnostic, &rope, &name);
        }
        errors += result.count(DiagnosticSeverity::Error);
        warnings += result.count(DiagnosticSeverity::Warning);
        tracing::info!(path = %name, functions = result.program.items(&db).len(), "Checked");
    }

    println!(
        "Checked {} file(s): {errors} error(s), {warnings} warning(s)",
        paths.len()
    );
    Ok(errors == 0)
}

fn list_symbols(path: &Path, json: bool) -> CliResult {
    let db = CicodeDatabaseImpl::default();
    let source = db.input(path.to_path_buf())?;
    let result = check_with_diagnostics(&db, source);
    let text = source.text(&db);
    let symbols = function_symbols(&db, result.program, text);

    if json {
        println!("{}", serde_json::to_string_pretty(&symbols)?);
    } else {
        let index = LineIndex::new(text);
        for symbol in &symbols {
            println!("{}:{}: {symbol}", path.display(), symbol.line);
            if let Some(summary) = &symbol.summary {
                println!("    {summary}");
            }
        }
        for diagnostic in result.diagnostics.iter().filter(|d| d.is_error()) {
            eprintln!(
                "{}:{}: {}",
                path.display(),
                index.location(diagnostic.span),
                diagnostic.message
            );
        }
    }
    Ok(!result.has_errors())
}
