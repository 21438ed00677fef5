//! Shared infrastructure for the Cicode toolchain: source inputs, spans and
//! diagnostics.
pub mod database;
pub mod diagnostic;
pub mod line_index;
pub mod span;

pub use database::{CicodeDatabaseImpl, Db, SourceFile};
pub use diagnostic::{CompilationPhase, Diagnostic, DiagnosticSeverity};
pub use line_index::LineIndex;
pub use span::{Span, Spanned};
