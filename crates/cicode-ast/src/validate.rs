//! Checks on lowered programs that the grammar cannot express.

use std::collections::HashMap;

use cicode_core::{CompilationPhase, Diagnostic, DiagnosticSeverity};
use salsa::Accumulator;

use crate::ast::*;

fn report(db: &dyn salsa::Database, severity: DiagnosticSeverity, span: Span, message: String) {
    Diagnostic {
        message,
        span,
        severity,
        phase: CompilationPhase::Validation,
    }
    .accumulate(db);
}

/// Validate every function in `program`, accumulating diagnostics.
#[salsa::tracked]
pub fn validate_program<'db>(db: &'db dyn salsa::Database, program: Program<'db>) {
    // Cicode identifiers are case-insensitive.
    let mut seen: HashMap<String, Span> = HashMap::new();
    for function in program.functions(db) {
        let name = function.name(db);
        if seen
            .insert(name.to_ascii_uppercase(), function.name_span(db))
            .is_some()
        {
            report(
                db,
                DiagnosticSeverity::Error,
                function.name_span(db),
                format!("function `{name}` is already defined"),
            );
        }
        validate_function(db, function);
    }
}

#[salsa::tracked]
fn validate_function<'db>(db: &'db dyn salsa::Database, function: FunctionDefinition<'db>) {
    let name = function.name(db);
    check_declarations(db, function);
    check_doc(db, function);

    let mut seen_default = false;
    for parameter in function.parameters(db) {
        if parameter.default.is_some() {
            seen_default = true;
        } else if seen_default {
            report(
                db,
                DiagnosticSeverity::Error,
                parameter.span,
                format!(
                    "parameter `{}` needs a default value because an earlier parameter has one",
                    parameter.name
                ),
            );
        }
    }

    let return_type = function.return_type(db);
    let mut returns_value = false;
    for (statement, span) in function.body(db).walk() {
        let Statement::Return(value) = statement else {
            continue;
        };
        match (return_type, value) {
            (ReturnType::Void, Some((_, value_span))) => report(
                db,
                DiagnosticSeverity::Error,
                *value_span,
                format!("VOID function `{name}` cannot return a value"),
            ),
            (ReturnType::Value(ty), None) => report(
                db,
                DiagnosticSeverity::Error,
                *span,
                format!("function `{name}` must return a {ty} value"),
            ),
            (ReturnType::Value(_), Some(_)) => returns_value = true,
            (ReturnType::Void, None) => {}
        }
    }

    if let ReturnType::Value(ty) = return_type
        && !returns_value
    {
        report(
            db,
            DiagnosticSeverity::Warning,
            function.name_span(db),
            format!("function `{name}` is declared {ty} but never returns a value"),
        );
    }
}

/// Parameters and local variables share one namespace per function.
fn check_declarations(db: &dyn salsa::Database, function: FunctionDefinition<'_>) {
    let mut seen: HashMap<String, Span> = HashMap::new();
    let parameters = function
        .parameters(db)
        .iter()
        .map(|parameter| (&parameter.name, parameter.span, "parameter"));
    let locals = function
        .locals(db)
        .iter()
        .flat_map(|declaration| &declaration.variables)
        .map(|variable| (&variable.name, variable.span, "variable"));

    for (name, span, what) in parameters.chain(locals) {
        if seen.insert(name.to_ascii_uppercase(), span).is_some() {
            report(
                db,
                DiagnosticSeverity::Error,
                span,
                format!("{what} `{name}` is declared more than once"),
            );
        }
    }
}

/// Doc `<param>` entries should name a parameter of the function.
fn check_doc(db: &dyn salsa::Database, function: FunctionDefinition<'_>) {
    let Some(doc) = function.doc(db) else {
        return;
    };
    let parameters = function.parameters(db);
    for param in &doc.params {
        let known = parameters
            .iter()
            .any(|parameter| parameter.name.eq_ignore_ascii_case(&param.name));
        if !known {
            report(
                db,
                DiagnosticSeverity::Info,
                param.span,
                format!(
                    "documented parameter `{}` is not a parameter of `{}`",
                    param.name,
                    function.name(db)
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use cicode_core::SourceFile;
    use salsa::Database;

    use super::*;
    use crate::parser::parse_source_file;

    #[salsa::tracked]
    fn check(db: &dyn salsa::Database, source: SourceFile) {
        let program = parse_source_file(db, source);
        validate_program(db, program);
    }

    fn diagnostics(text: &str) -> Vec<(DiagnosticSeverity, String)> {
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(db, "check.ci".into(), text.to_string());
            check(db, source);
            check::accumulated::<Diagnostic>(db, source)
                .into_iter()
                .map(|diagnostic| (diagnostic.severity, diagnostic.message.clone()))
                .collect()
        })
    }

    fn messages(text: &str) -> Vec<String> {
        diagnostics(text).into_iter().map(|(_, message)| message).collect()
    }

    #[test]
    fn test_valid_program() {
        let source = "\
INT FUNCTION Add(INT a, INT b = 1)
\tINT total = 0;
\ttotal = a + b;
\tRETURN total;
END

FUNCTION Main()
\tAdd(1);
END
";
        assert!(diagnostics(source).is_empty());
    }

    #[test]
    fn test_duplicate_functions_ignore_case() {
        assert_eq!(
            messages("FUNCTION Start()\nEND\nFUNCTION START()\nEND"),
            ["function `START` is already defined"]
        );
    }

    #[test]
    fn test_duplicate_declarations() {
        assert_eq!(
            messages("FUNCTION F(INT a, STRING A)\n INT b, a;\nEND"),
            [
                "parameter `A` is declared more than once",
                "variable `a` is declared more than once",
            ]
        );
    }

    #[test]
    fn test_required_parameter_after_default() {
        assert_eq!(
            messages("FUNCTION F(INT a = 1, INT b)\nEND"),
            ["parameter `b` needs a default value because an earlier parameter has one"]
        );
    }

    #[test]
    fn test_return_value_in_void_function() {
        assert_eq!(
            messages("VOID FUNCTION F()\n IF 1 THEN\n  RETURN 2;\n END\nEND"),
            ["VOID function `F` cannot return a value"]
        );
    }

    #[test]
    fn test_missing_return_value() {
        assert_eq!(
            diagnostics("STRING FUNCTION Name()\n RETURN;\nEND"),
            [
                (
                    DiagnosticSeverity::Error,
                    "function `Name` must return a STRING value".to_string()
                ),
                (
                    DiagnosticSeverity::Warning,
                    "function `Name` is declared STRING but never returns a value".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_documented_parameter_must_exist() {
        let source = "\
// <param name=\"Level\">Alarm level.</param>
// <param name=\"colour\">Not a parameter.</param>
FUNCTION Raise(INT level)
END";
        assert_eq!(
            diagnostics(source),
            [(
                DiagnosticSeverity::Info,
                "documented parameter `colour` is not a parameter of `Raise`".to_string()
            )]
        );
    }
}
