//! Diagnostic messages emitted while checking Cicode sources.

use derive_more::Display;

use crate::span::Span;

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[salsa::accumulator]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub severity: DiagnosticSeverity,
    pub phase: CompilationPhase,
}

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    #[display("ERROR")]
    Error,
    #[display("WARNING")]
    Warning,
    #[display("INFO")]
    Info,
}

/// Phase in which a diagnostic was emitted.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum CompilationPhase {
    #[display("parsing")]
    Parsing,
    #[display("ast-generation")]
    AstGeneration,
    #[display("validation")]
    Validation,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(DiagnosticSeverity::Error.to_string(), "ERROR");
        assert_eq!(DiagnosticSeverity::Warning.to_string(), "WARNING");
        assert_eq!(CompilationPhase::AstGeneration.to_string(), "ast-generation");
    }

    #[test]
    fn test_is_error() {
        let diagnostic = Diagnostic {
            message: "unused".to_string(),
            span: Span::new(0, 1),
            severity: DiagnosticSeverity::Warning,
            phase: CompilationPhase::Validation,
        };
        assert!(!diagnostic.is_error());
    }
}
