//! Checking pipeline for Cicode sources.
//!
//! ```text
//! SourceFile
//!     │
//!     ▼
//! parse_source_file ─► Program (syntax errors accumulated)
//!     │
//!     ▼
//! validate_program ─► semantic diagnostics
//! ```
//!
//! Every stage is a Salsa tracked function, so editing one file only
//! re-runs the stages for that file. Diagnostics are collected with the
//! `Diagnostic` accumulator.

use cicode_ast::{Program, parse_source_file, validate_program};
use cicode_core::{Diagnostic, DiagnosticSeverity, SourceFile};

/// Parse and validate `source`.
#[salsa::tracked]
pub fn check_source_file<'db>(db: &'db dyn salsa::Database, source: SourceFile) -> Program<'db> {
    let program = parse_source_file(db, source);
    validate_program(db, program);
    program
}

pub struct CheckResult<'db> {
    pub program: Program<'db>,
    /// Diagnostics from every stage, ordered by position.
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult<'_> {
    pub fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Run the checking pipeline and collect its diagnostics.
pub fn check_with_diagnostics<'db>(
    db: &'db dyn salsa::Database,
    source: SourceFile,
) -> CheckResult<'db> {
    let program = check_source_file(db, source);
    let mut diagnostics: Vec<Diagnostic> = check_source_file::accumulated::<Diagnostic>(db, source)
        .into_iter()
        .cloned()
        .collect();
    diagnostics.sort_by_key(|diagnostic| (diagnostic.span.start, diagnostic.span.end));
    CheckResult {
        program,
        diagnostics,
    }
}
