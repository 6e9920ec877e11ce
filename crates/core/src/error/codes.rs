//! Error codes and severities for translation diagnostics.

use serde::Serialize;

/// Diagnostic severity.
///
/// Translation never stops on a node-level problem: a warning is reported and
/// the output is kept, an error turns the offending node into a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Output produced, but a semantic risk was detected
    Warning,
    /// The local node became an error placeholder
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Error code categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // ===== Structural Mismatch (E1xxx) =====
    E1001, // Unrecognized syntax node
    E1002, // Unsupported pattern
    E1003, // Malformed operator sequence
    E1004, // Unresolved implicit member

    // ===== Unresolvable Binding (E2xxx) =====
    E2001, // Arguments do not match parameters
    E2002, // Unlabeled payload binding
    E2003, // Tuple shuffle label/index mismatch
    E2004, // Dangling binding

    // ===== Upstream Data Failure (E3xxx) =====
    E3001, // Type or symbol query failed after retry
    E3002, // Input could not be read

    // ===== Detectable Semantic Risk (W4xxx) =====
    W4001, // Mutable stored property in a value type
    W4002, // Custom operator with unknown precedence
    W4003, // Untranslated standard-library reference
    W4004, // Impure switch subject evaluated per case
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::W4001,
        ErrorCode::W4002,
        ErrorCode::W4003,
        ErrorCode::W4004,
    ];

    /// Numeric part of the code.
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::E1001 => 1001,
            ErrorCode::E1002 => 1002,
            ErrorCode::E1003 => 1003,
            ErrorCode::E1004 => 1004,
            ErrorCode::E2001 => 2001,
            ErrorCode::E2002 => 2002,
            ErrorCode::E2003 => 2003,
            ErrorCode::E2004 => 2004,
            ErrorCode::E3001 => 3001,
            ErrorCode::E3002 => 3002,
            ErrorCode::W4001 => 4001,
            ErrorCode::W4002 => 4002,
            ErrorCode::W4003 => 4003,
            ErrorCode::W4004 => 4004,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorCode::W4001 | ErrorCode::W4002 | ErrorCode::W4003 | ErrorCode::W4004
        )
    }

    /// Default severity for diagnostics carrying this code.
    pub fn severity(&self) -> Severity {
        if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    /// Error type name shown in formatted diagnostics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004 => {
                "StructuralMismatch"
            }
            ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003 | ErrorCode::E2004 => {
                "UnresolvableBinding"
            }
            ErrorCode::E3001 | ErrorCode::E3002 => "UpstreamFailure",
            ErrorCode::W4001 | ErrorCode::W4002 | ErrorCode::W4003 | ErrorCode::W4004 => {
                "SemanticRisk"
            }
        }
    }

    /// Short description of the problem.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unrecognized syntax",
            ErrorCode::E1002 => "unsupported pattern",
            ErrorCode::E1003 => "malformed operator sequence",
            ErrorCode::E1004 => "unresolved implicit member",
            ErrorCode::E2001 => "argument mismatch",
            ErrorCode::E2002 => "unlabeled payload binding",
            ErrorCode::E2003 => "tuple shuffle mismatch",
            ErrorCode::E2004 => "dangling binding",
            ErrorCode::E3001 => "upstream query failed",
            ErrorCode::E3002 => "unreadable input",
            ErrorCode::W4001 => "mutable value type",
            ErrorCode::W4002 => "custom operator",
            ErrorCode::W4003 => "untranslated standard library",
            ErrorCode::W4004 => "impure switch subject",
        }
    }

    /// Suggestion text for the code, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::E1001 => Some("Rewrite the construct using a supported form, or add a literal directive."),
            ErrorCode::E1002 => Some("Split the pattern into explicit comparisons."),
            ErrorCode::E1003 => None,
            ErrorCode::E1004 => Some("Spell out the type before the member (`Type.member`)."),
            ErrorCode::E2001 => Some("Pass every argument with the label the declaration expects."),
            ErrorCode::E2002 => Some("Label the associated values of the enum case."),
            ErrorCode::E2003 => None,
            ErrorCode::E2004 => Some("Declare each variable in its own statement."),
            ErrorCode::E3001 => Some("Rebuild the index and run the translation again."),
            ErrorCode::E3002 => None,
            ErrorCode::W4001 => Some("Value types are copied on assignment; the target language copies references. Prefer `let` properties."),
            ErrorCode::W4002 => Some("Check the translated operator's precedence and associativity by hand."),
            ErrorCode::W4003 => Some("Translate the reference by hand or add a literal directive."),
            ErrorCode::W4004 => Some("Store the subject in a local variable before the switch."),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_num = self.code();
        // Warning codes start with W, error codes start with E
        if self.is_warning() {
            write!(f, "W{:04}", code_num)
        } else {
            write!(f, "E{:04}", code_num)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnostic code '{0}'")]
pub struct UnknownCode(pub String);

impl std::str::FromStr for ErrorCode {
    type Err = UnknownCode;

    /// Accepts `E2001`, `w4001` or a bare `4001`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let wanted = text.trim().to_ascii_uppercase();
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.to_string() == wanted || code.code().to_string() == wanted)
            .ok_or_else(|| UnknownCode(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("E2001".parse::<ErrorCode>(), Ok(ErrorCode::E2001));
        assert_eq!("w4003".parse::<ErrorCode>(), Ok(ErrorCode::W4003));
        assert_eq!("1002".parse::<ErrorCode>(), Ok(ErrorCode::E1002));
        assert_eq!("E9999".parse::<ErrorCode>(), Err(UnknownCode("E9999".into())));
    }

    #[test]
    fn test_code_display() {
        assert_eq!(ErrorCode::E2001.to_string(), "E2001");
        assert_eq!(ErrorCode::W4003.to_string(), "W4003");
    }

    #[test]
    fn test_code_severity() {
        assert_eq!(ErrorCode::E1001.severity(), Severity::Error);
        assert_eq!(ErrorCode::W4002.severity(), Severity::Warning);
        assert!(Severity::Error > Severity::Warning);
    }
}
