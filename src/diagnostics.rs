//! Diagnostic formatting for the `cicode` CLI.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use cicode_core::{CompilationPhase, Diagnostic, DiagnosticSeverity};
use ropey::Rope;

/// Get the display color for a compilation phase.
pub fn phase_color(phase: &CompilationPhase) -> Color {
    match phase {
        CompilationPhase::Parsing => Color::Red,
        CompilationPhase::AstGeneration => Color::Yellow,
        CompilationPhase::Validation => Color::Magenta,
    }
}

fn report_kind(severity: DiagnosticSeverity) -> ReportKind<'static> {
    match severity {
        DiagnosticSeverity::Error => ReportKind::Error,
        DiagnosticSeverity::Warning => ReportKind::Warning,
        DiagnosticSeverity::Info => ReportKind::Advice,
    }
}

/// Normalize a span so that it is non-empty and points into the source
/// (ariadne cannot label zero-width or out-of-range spans).
pub fn normalize_span(start: usize, end: usize, source_len: usize) -> (usize, usize) {
    let start = start.min(source_len.saturating_sub(1));
    (start, end.clamp(start + 1, source_len.max(start + 1)))
}

fn build_report<'a>(
    diag: &Diagnostic,
    source_len: usize,
    file_path: &'a str,
    color: bool,
) -> Report<'static, (&'a str, std::ops::Range<usize>)> {
    let (start, end) = normalize_span(diag.span.start, diag.span.end, source_len);
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);

    Report::build(report_kind(diag.severity), (file_path, start..end))
        .with_config(config)
        .with_code(diag.phase)
        .with_message(&diag.message)
        .with_label(
            Label::new((file_path, start..end))
                .with_message(&diag.message)
                .with_color(phase_color(&diag.phase)),
        )
        .finish()
}

/// Print a diagnostic to stderr using ariadne.
pub fn print_diagnostic(diag: &Diagnostic, source: &Rope, file_path: &str) {
    let source_text = source.to_string();
    build_report(diag, source_text.len(), file_path, true)
        .eprint((file_path, Source::from(source_text)))
        .ok();
}

/// Render a diagnostic without colors.
pub fn render_diagnostic(diag: &Diagnostic, source: &Rope, file_path: &str) -> String {
    let source_text = source.to_string();
    let mut out = Vec::new();
    build_report(diag, source_text.len(), file_path, false)
        .write((file_path, Source::from(source_text)), &mut out)
        .ok();
    String::from_utf8_lossy(&out).into_owned()
}
