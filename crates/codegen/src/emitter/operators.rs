//! Operator spelling and target precedence.

use phf::phf_map;

/// Source operators the target spells differently.
static OPERATORS: phf::Map<&'static str, &'static str> = phf_map! {
    "??" => "?:",
    "..<" => "until",
    "..." => "..",
    "&" => "and",
    "|" => "or",
    "^" => "xor",
    "<<" => "shl",
    ">>" => "shr",
    "as!" => "as",
    "&+" => "+",
    "&-" => "-",
    "&*" => "*",
};

/// Target precedence levels, higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Ternaries (`if`-expressions), closures and anything else that must be
    /// wrapped whenever it is an operand.
    Lowest,
    Assignment,
    Disjunction,
    Conjunction,
    Equality,
    Comparison,
    NamedCheck,
    Elvis,
    Infix,
    Range,
    Additive,
    Multiplicative,
    Cast,
    Prefix,
    Postfix,
    Atom,
}

/// The target spelling of a binary operator.
pub fn translate_operator(op: &str) -> &str {
    OPERATORS.get(op).copied().unwrap_or(op)
}

/// Precedence of an operator already in its target spelling. Operators the
/// target does not know (custom source operators) are treated as infix
/// function calls.
pub fn binary_precedence(target_op: &str) -> Precedence {
    match target_op {
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" => Precedence::Assignment,
        "||" => Precedence::Disjunction,
        "&&" => Precedence::Conjunction,
        "==" | "!=" | "===" | "!==" => Precedence::Equality,
        "<" | ">" | "<=" | ">=" => Precedence::Comparison,
        "is" | "!is" | "in" | "!in" => Precedence::NamedCheck,
        "?:" => Precedence::Elvis,
        ".." => Precedence::Range,
        "+" | "-" => Precedence::Additive,
        "*" | "/" | "%" => Precedence::Multiplicative,
        "as" | "as?" => Precedence::Cast,
        _ => Precedence::Infix,
    }
}

/// Whether a target operator is right associative.
pub fn is_right_associative(target_op: &str) -> bool {
    matches!(target_op, "?:" | "=" | "+=" | "-=" | "*=" | "/=" | "%=")
}

/// Whether a target operator is written without surrounding spaces (`1..n`).
pub fn is_tight(target_op: &str) -> bool {
    target_op == ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        assert_eq!(translate_operator("??"), "?:");
        assert_eq!(translate_operator("..<"), "until");
        assert_eq!(translate_operator("&"), "and");
        assert_eq!(translate_operator("==="), "===");
        assert_eq!(translate_operator("+"), "+");
    }

    #[test]
    fn test_bitwise_words_bind_looser_than_arithmetic() {
        // The source's `&` binds like `*`; the target's `and` binds looser
        // than `+`, so `(a & b) + c` keeps its parentheses.
        assert!(binary_precedence("and") > binary_precedence("=="));
        assert!(binary_precedence("and") < binary_precedence("+"));
        assert!(binary_precedence("until") < binary_precedence(".."));
        assert!(binary_precedence("?:") < binary_precedence("until"));
    }

    #[test]
    fn test_only_closed_ranges_are_tight() {
        assert!(is_tight(translate_operator("...")));
        assert!(!is_tight(translate_operator("..<")));
        assert!(!is_tight("?:"));
        assert!(!is_tight("+"));
    }
}
