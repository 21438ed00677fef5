//! Conversion between byte offsets and line/column positions.

use crate::span::Span;

/// Line index for a source file.
pub struct LineIndex {
    /// Byte offset of the start of each line (0-indexed).
    line_starts: Vec<usize>,
    source: String,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            source: source.to_string(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a 0-based (line, column), where the column
    /// counts characters. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        (line, self.source[line_start..offset].chars().count())
    }

    /// Convert a 0-based (line, column) back to a byte offset.
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line)?;
        let text = self.line_text(line)?;
        Some(
            text.char_indices()
                .nth(column)
                .map_or(start + text.len(), |(i, _)| start + i),
        )
    }

    /// 1-based `line:column` label for the start of `span`.
    pub fn location(&self, span: Span) -> String {
        let (line, column) = self.line_col(span.start);
        format!("{}:{}", line + 1, column + 1)
    }

    fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\n'))
    }
}
