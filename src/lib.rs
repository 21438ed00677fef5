//! Cicode grammar toolkit: parse, check and inspect Cicode sources.
pub mod diagnostics;
pub mod pipeline;
pub mod symbols;

pub use cicode_ast::{FunctionDefinition, Program, parse_source_file, validate_program};
pub use cicode_core::{
    CicodeDatabaseImpl, CompilationPhase, Db, Diagnostic, DiagnosticSeverity, SourceFile, Span,
};
pub use cicode_grammar::{
    GrammarLoadError, Language, Parser, SyntaxError, Tree, language, new_parser, syntax_errors,
    to_sexp, verify_language_loads,
};
pub use pipeline::{CheckResult, check_source_file, check_with_diagnostics};
