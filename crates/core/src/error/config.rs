//! What the diagnostic formatter shows.

use super::codes::{ErrorCode, Severity};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// Quote the source lines around the range, when source text is attached
    pub show_context: bool,
    /// Lines quoted on each side of the offending line
    pub context_lines: usize,
    /// Print the IR snapshot attached to a diagnostic
    pub show_snapshots: bool,
    /// Diagnostics below this severity are dropped by `format_all`
    pub min_severity: Severity,
    pub suppressed: HashSet<ErrorCode>,
}

impl ErrorConfig {
    pub fn new() -> Self {
        ErrorConfig {
            show_context: true,
            context_lines: 2,
            show_snapshots: false,
            min_severity: Severity::Warning,
            suppressed: HashSet::new(),
        }
    }

    /// Errors only, one header and message each.
    pub fn minimal() -> Self {
        ErrorConfig {
            show_context: false,
            context_lines: 0,
            min_severity: Severity::Error,
            ..Self::new()
        }
    }

    /// Wider context plus the snapshot of every failing node.
    pub fn verbose() -> Self {
        ErrorConfig {
            context_lines: 5,
            show_snapshots: true,
            ..Self::new()
        }
    }

    pub fn suppress(&mut self, code: ErrorCode) {
        self.suppressed.insert(code);
    }

    /// Whether `format_all` prints this diagnostic.
    pub fn shows(&self, severity: Severity, code: Option<ErrorCode>) -> bool {
        severity >= self.min_severity && code.is_none_or(|code| !self.suppressed.contains(&code))
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shows() {
        let mut config = ErrorConfig::new();
        config.suppress(ErrorCode::W4003);
        assert!(config.shows(Severity::Warning, Some(ErrorCode::W4001)));
        assert!(!config.shows(Severity::Warning, Some(ErrorCode::W4003)));
        assert!(config.shows(Severity::Error, None));
        assert!(!ErrorConfig::minimal().shows(Severity::Warning, None));
    }
}
