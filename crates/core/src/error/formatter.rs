//! Terminal rendering of diagnostics, colored with `owo-colors`.

use super::codes::Severity;
use super::config::ErrorConfig;
use super::diagnostic::Diagnostic;
use owo_colors::OwoColorize;

pub struct DiagnosticFormatter {
    config: ErrorConfig,
}

impl DiagnosticFormatter {
    pub fn new(config: ErrorConfig) -> Self {
        DiagnosticFormatter { config }
    }

    /// Render one diagnostic. The text ends with a newline.
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        // Severity header with error type and code (Error: UnresolvableBinding [E2001])
        let header = match diagnostic.severity {
            Severity::Error => "Error".bold().red().to_string(),
            Severity::Warning => "Warning".bold().yellow().to_string(),
        };
        match &diagnostic.code {
            Some(code) => output.push_str(&format!(
                "{}: {} [{}]\n",
                header,
                code.error_type().bold(),
                code.to_string().dimmed()
            )),
            None => output.push_str(&format!("{}\n", header)),
        }

        // Separator
        output.push_str(&format!("  {}\n", "|".blue()));

        output.push_str(&format!(
            "  {} {}: {}\n",
            "|".blue(),
            "Message".white().bold(),
            diagnostic.message
        ));

        // Context
        if self.config.show_context
            && let Some(context) = &diagnostic.context
        {
            let (line, col) = context.line_and_column();
            output.push_str(&format!("  {}\n", "|".blue()));

            let location_str = if let Some(filename) = &context.filename {
                format!("{}:{}:{}", filename, line, col)
            } else {
                format!("line {}:{}", line, col)
            };

            output.push_str(&format!(
                "  +--> {}: {}\n",
                "Location".cyan().bold(),
                location_str
            ));
            output.push_str(&format!("  {}\n", "|".blue()));

            if self.config.context_lines > 0 {
                let length = usize::from(context.span.len()).max(1);
                for (line_num, line_text) in context.context_lines(self.config.context_lines) {
                    if line_num == line {
                        output.push_str(&format!("  |{:5} | {}\n", line_num, line_text));
                        output.push_str(&format!(
                            "  |      | {}{}\n",
                            " ".repeat(col - 1),
                            "^".repeat(length).bright_yellow().bold()
                        ));
                    } else {
                        output.push_str(&format!("  |{:5} | {}\n", line_num, line_text.dimmed()));
                    }
                }
            } else {
                output.push_str(&format!("  |{:5} | {}\n", line, context.error_line()));
            }

            output.push_str(&format!("  {}\n", "|".blue()));
        } else if let Some(range) = diagnostic.range {
            output.push_str(&format!(
                "  +--> {}: bytes {}..{}\n",
                "Location".cyan().bold(),
                u32::from(range.start()),
                u32::from(range.end())
            ));
        }

        if self.config.show_snapshots
            && let Some(snapshot) = &diagnostic.snapshot
        {
            output.push_str(&format!("  = {}:\n", "snapshot".cyan().bold()));
            for line in snapshot.lines() {
                output.push_str(&format!("  |   {}\n", line.dimmed()));
            }
        }

        if let Some(suggestion) = &diagnostic.suggestion {
            output.push_str(&format!(
                "  +--> {}: {}\n",
                "Suggestion".green().bold(),
                suggestion
            ));
        }

        output
    }

    /// Every diagnostic the configuration lets through, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .filter(|d| self.config.shows(d.severity, d.code))
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::new(ErrorConfig::default())
    }
}
