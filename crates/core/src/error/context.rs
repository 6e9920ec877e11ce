//! Source text attached to a diagnostic so it can be quoted.

use text_size::TextRange;

/// The original source and the offending range in it.
///
/// Ranges come from the host tooling and may run past the text it was given;
/// every accessor clamps them.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Shown in the location line instead of a bare line number
    pub filename: Option<String>,
    pub source: String,
    pub span: TextRange,
}

impl ErrorContext {
    pub fn new(source: String, span: TextRange) -> Self {
        ErrorContext {
            filename: None,
            source,
            span,
        }
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    fn start(&self) -> usize {
        usize::from(self.span.start()).min(self.source.len())
    }

    fn end(&self) -> usize {
        usize::from(self.span.end()).clamp(self.start(), self.source.len())
    }

    /// 1-based line and byte column of the range start.
    pub fn line_and_column(&self) -> (usize, usize) {
        let start = self.start();
        let prefix = self.source.get(..start).unwrap_or("");
        let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
        let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = start - line_start + 1;
        (line, col)
    }

    /// The full line(s) the range touches.
    pub fn error_line(&self) -> &str {
        let start = self.start();
        let end = self.end();
        let line_start = self
            .source
            .get(..start)
            .and_then(|s| s.rfind('\n'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = self
            .source
            .get(end..)
            .and_then(|s| s.find('\n'))
            .map(|i| end + i)
            .unwrap_or(self.source.len());

        self.source.get(line_start..line_end).unwrap_or("")
    }

    /// Numbered lines within `num_lines` of the offending one.
    pub fn context_lines(&self, num_lines: usize) -> Vec<(usize, String)> {
        let lines: Vec<&str> = self.source.lines().collect();
        let (line, _) = self.line_and_column();
        let error_line_num = line - 1;

        let start_line = error_line_num.saturating_sub(num_lines);
        let end_line = (error_line_num + num_lines + 1).min(lines.len());

        lines
            .get(start_line..end_line)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(i, line)| (start_line + i + 1, line.to_string()))
            .collect()
    }
}
